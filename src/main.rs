// https://docs.esp-rs.org/esp-idf-svc/esp_idf_svc/
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::delay::Delay;
    use esp_idf_svc::hal::gpio::{self, InputPin, OutputPin, PinDriver};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::prelude::*;
    use esp_idf_svc::hal::spi;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use inkdate::app::Device;
    use inkdate::config::Config;
    use inkdate::esp::{EpdPanel, EspLink, Pins, SntpTimeSource};
    use inkdate::poll::ThreadSleeper;

    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("setup");

    let config = Config::default();
    if config.credentials.is_placeholder() {
        log::warn!("No WiFi credentials compiled in, set WIFI_SSID and WIFI_PASS when building");
    }

    let peripherals = Peripherals::take().context("Could not take peripherals")?;
    let pins = peripherals.pins;
    let sys_loop = EspSystemEventLoop::take().context("Could not take system event loop")?;
    let nvs = EspDefaultNvsPartition::take().context("Could not take NVS partition")?;

    log::info!(
        "Configuring panel SPI (SCK={}, MOSI={}, CS={}, DC={}, RST={}, BUSY={})",
        Pins::SCK,
        Pins::MOSI,
        Pins::CS,
        Pins::DC,
        Pins::RST,
        Pins::BSY
    );
    let spi = spi::SpiDeviceDriver::new_single(
        peripherals.spi2,
        pins.gpio18,                    // SCK - Pins::SCK
        pins.gpio23,                    // MOSI - Pins::MOSI
        Option::<gpio::AnyIOPin>::None, // No MISO needed for display
        Some(pins.gpio5),               // CS - Pins::CS
        &spi::SpiDriverConfig::new(),
        &spi::SpiConfig::new().baudrate(4.MHz().into()),
    )
    .context("Could not create SPI device driver")?;

    let busy = PinDriver::input(pins.gpio4.downgrade_input())
        .context("Failed to set busy pin as input")?; // Pins::BSY
    let dc = PinDriver::output(pins.gpio17.downgrade_output())
        .context("Failed to set dc pin as output")?; // Pins::DC
    let rst = PinDriver::output(pins.gpio16.downgrade_output())
        .context("Failed to set rst pin as output")?; // Pins::RST

    let panel =
        EpdPanel::new(spi, busy, dc, rst, Delay::default()).context("Could not create EPD driver")?;

    let link = EspLink::new(peripherals.modem, sys_loop, Some(nvs))
        .context("Could not create WiFi driver")?;

    let mut device = Device::new(config, link, SntpTimeSource::default(), panel, ThreadSleeper);

    // Without a synced clock the panel shows the failure line instead of a date
    if let Err(e) = device.setup() {
        log::error!("Startup time sync failed: {}", e);
    }
    log::info!("setup done");

    device.run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("inkdate runs on ESP-IDF only, build with --target xtensa-esp32-espidf");
}
