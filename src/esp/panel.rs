//! GDEW042T2 4.2" panel driven through epd-waveshare
//!
//! Drawing happens in a [`Display4in2`] buffer in RAM. A commit sends the
//! whole buffer and triggers a full refresh, which takes a few seconds on
//! this panel. Between refreshes the controller sits in deep sleep and has to
//! be woken up again before the next commit.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use epd_waveshare::epd4in2::{Display4in2, Epd4in2};
use epd_waveshare::prelude::*;
use esp_idf_svc::hal::delay::Delay;
use esp_idf_svc::hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver};
use esp_idf_svc::hal::spi::{SpiDeviceDriver, SpiDriver};

use crate::error::{Error, Result};
use crate::render::{Frame, Panel, PAPER};

pub type PanelSpi = SpiDeviceDriver<'static, SpiDriver<'static>>;
pub type BusyPin = PinDriver<'static, AnyInputPin, Input>;
pub type ControlPin = PinDriver<'static, AnyOutputPin, Output>;

type Epd = Epd4in2<PanelSpi, BusyPin, ControlPin, ControlPin, Delay>;

fn panel_error(context: &str, e: impl std::fmt::Debug) -> Error {
    Error::Panel(format!("{}: {:?}", context, e))
}

pub struct EpdPanel {
    spi: PanelSpi,
    epd: Epd,
    delay: Delay,
    buffer: Display4in2,
    asleep: bool,
}

impl EpdPanel {
    /// Reset and initialize the panel controller.
    pub fn new(
        mut spi: PanelSpi,
        busy: BusyPin,
        dc: ControlPin,
        rst: ControlPin,
        mut delay: Delay,
    ) -> Result<Self> {
        log::info!("Initializing 4.2\" e-paper panel");
        let epd = Epd4in2::new(&mut spi, busy, dc, rst, &mut delay, None)
            .map_err(|e| panel_error("Panel init failed", e))?;

        Ok(Self {
            spi,
            epd,
            delay,
            buffer: Display4in2::default(),
            asleep: false,
        })
    }
}

impl Panel for EpdPanel {
    fn clear(&mut self) -> Result<()> {
        self.buffer
            .clear(Color::from(PAPER))
            .map_err(|e| panel_error("Clearing buffer failed", e))
    }

    fn draw(&mut self, frame: &Frame) -> Result<()> {
        frame
            .draw(&mut self.buffer.color_converted::<BinaryColor>())
            .map_err(|e| panel_error("Drawing frame failed", e))
    }

    fn commit(&mut self) -> Result<()> {
        if self.asleep {
            self.epd
                .wake_up(&mut self.spi, &mut self.delay)
                .map_err(|e| panel_error("Panel wake up failed", e))?;
            self.asleep = false;
        }

        log::info!("Full refresh of the panel");
        self.epd
            .update_and_display_frame(&mut self.spi, self.buffer.buffer(), &mut self.delay)
            .map_err(|e| panel_error("Panel refresh failed", e))
    }

    fn power_down(&mut self) -> Result<()> {
        if self.asleep {
            return Ok(());
        }
        self.epd
            .sleep(&mut self.spi, &mut self.delay)
            .map_err(|e| panel_error("Panel sleep failed", e))?;
        self.asleep = true;
        log::info!("Panel powered down");
        Ok(())
    }
}
