//! Pin definitions for the 4.2" e-paper panel
//!
//! The panel hangs off the ESP32 VSPI pins. DC, RST and BUSY are free GPIOs.

/// Pin configuration constants for the panel
pub struct Pins;

impl Pins {
    /// Chip Select pin for SPI display
    pub const CS: u8 = 5;
    /// Data/Command control pin (High for data, Low for command)
    pub const DC: u8 = 17;
    /// Reset pin for display
    pub const RST: u8 = 16;
    /// Busy status pin
    pub const BSY: u8 = 4;
    /// SPI Clock pin
    pub const SCK: u8 = 18;
    /// SPI Master Out Slave In
    pub const MOSI: u8 = 23;
}
