//! ESP-IDF implementations of the link, time source and panel

pub mod panel;
pub mod pins;
pub mod sntp;
pub mod wifi;

pub use panel::EpdPanel;
pub use pins::Pins;
pub use sntp::SntpTimeSource;
pub use wifi::EspLink;
