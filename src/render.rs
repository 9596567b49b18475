//! Frame composition and the render cycle
//!
//! A [`Frame`] is a small display list: four fixed rectangles forming the
//! border and header band, the date line, and optionally a wrapped quote.
//! It is drawn into the panel driver's off-screen buffer, committed with a
//! full refresh and then the panel is powered down until the next cycle.
//!
//! ```text
//! (0,0) +----------------------------------------+ (400,0)
//!       | Saturday, April 01 2023                | header, baseline y=22
//!       |========================================| band y=26..28
//!       | Genius is one percent inspiration and  |
//!       | ...                                    |
//!       |                     - Thomas A. Edison |
//!       +----------------------------------------+ (400,300)
//! ```

use embedded_graphics::mono_font::iso_8859_15::{FONT_10X20, FONT_9X15};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use crate::error::Result;
use crate::quotes::Quote;

pub use epd_waveshare::epd4in2::{HEIGHT, WIDTH};

/// Black on the e-paper panel
pub const INK: BinaryColor = BinaryColor::On;
/// White on the e-paper panel
pub const PAPER: BinaryColor = BinaryColor::Off;

/// Border and header band, drawn in order.
pub const FRAME_RECTS: [(Rectangle, BinaryColor); 4] = [
    (Rectangle::new(Point::new(0, 0), Size::new(400, 300)), INK),
    (Rectangle::new(Point::new(5, 5), Size::new(390, 290)), PAPER),
    (Rectangle::new(Point::new(0, 26), Size::new(400, 274)), INK),
    (Rectangle::new(Point::new(5, 28), Size::new(390, 262)), PAPER),
];

/// Baseline origin of the date line
pub const DATE_POSITION: Point = Point::new(9, 22);
/// Baseline origin of the first quote line
pub const QUOTE_POSITION: Point = Point::new(9, 60);
/// Right edge the author line is aligned to
pub const AUTHOR_RIGHT_EDGE: i32 = 391;
pub const QUOTE_LINE_HEIGHT: i32 = 20;
/// Lines that fit between the quote origin and the bottom border
pub const QUOTE_MAX_LINES: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    /// Date line
    Primary,
    /// Quote body and author
    Secondary,
}

impl FontRole {
    pub fn font(self) -> &'static MonoFont<'static> {
        match self {
            FontRole::Primary => &FONT_10X20,
            FontRole::Secondary => &FONT_9X15,
        }
    }

    pub fn char_width(self) -> u32 {
        let font = self.font();
        font.character_size.width + font.character_spacing
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextItem {
    pub text: String,
    pub position: Point,
    pub font: FontRole,
    pub alignment: Alignment,
}

impl TextItem {
    fn left(text: impl Into<String>, position: Point, font: FontRole) -> Self {
        Self {
            text: text.into(),
            position,
            font,
            alignment: Alignment::Left,
        }
    }

    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let character_style = MonoTextStyle::new(self.font.font(), INK);
        let text_style = TextStyleBuilder::new()
            .alignment(self.alignment)
            .baseline(Baseline::Alphabetic)
            .build();
        Text::with_text_style(&self.text, self.position, character_style, text_style)
            .draw(target)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub date: TextItem,
    pub quote: Vec<TextItem>,
}

impl Frame {
    /// Lay out one refresh worth of content.
    pub fn compose(date_line: &str, quote: Option<&Quote>) -> Self {
        let date = TextItem::left(date_line, DATE_POSITION, FontRole::Primary);
        let quote = quote.map(layout_quote).unwrap_or_default();
        Self { date, quote }
    }

    pub fn rects(&self) -> &'static [(Rectangle, BinaryColor)] {
        &FRAME_RECTS
    }

    /// Draw the border, the date and the quote. The target is expected to be
    /// cleared to [`PAPER`] already.
    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        for (rect, color) in self.rects() {
            rect.into_styled(PrimitiveStyle::with_fill(*color))
                .draw(target)?;
        }
        self.date.draw(target)?;
        for line in &self.quote {
            line.draw(target)?;
        }
        Ok(())
    }
}

fn layout_quote(quote: &Quote) -> Vec<TextItem> {
    let usable = AUTHOR_RIGHT_EDGE - QUOTE_POSITION.x;
    let max_cols = usable as usize / FontRole::Secondary.char_width() as usize;

    let mut lines = wrap_words(&quote.text, max_cols);
    lines.truncate(QUOTE_MAX_LINES - 1);

    let mut items: Vec<TextItem> = lines
        .into_iter()
        .enumerate()
        .map(|(row, line)| {
            let position = QUOTE_POSITION + Point::new(0, row as i32 * QUOTE_LINE_HEIGHT);
            TextItem::left(line, position, FontRole::Secondary)
        })
        .collect();

    // Author sits one blank line below the body
    let author_row = items.len() as i32 + 1;
    items.push(TextItem {
        text: format!("- {}", quote.author),
        position: Point::new(
            AUTHOR_RIGHT_EDGE,
            QUOTE_POSITION.y + author_row * QUOTE_LINE_HEIGHT,
        ),
        font: FontRole::Secondary,
        alignment: Alignment::Right,
    });
    items
}

/// Greedy word wrap. Words longer than a line are split.
pub fn wrap_words(text: &str, max_cols: usize) -> Vec<String> {
    let max_cols = max_cols.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_cols {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_cols);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_cols && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// The physical e-paper panel together with its off-screen buffer.
pub trait Panel {
    /// Clear the off-screen buffer to [`PAPER`].
    fn clear(&mut self) -> Result<()>;

    /// Draw into the off-screen buffer.
    fn draw(&mut self, frame: &Frame) -> Result<()>;

    /// Push the buffer to the panel with a full refresh.
    fn commit(&mut self) -> Result<()>;

    /// Put the panel controller into its lowest power state.
    fn power_down(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Preparing,
    Drawing,
    Committing,
    PoweredDown,
}

#[derive(Debug)]
pub struct RenderCycle {
    phase: Phase,
}

impl Default for RenderCycle {
    fn default() -> Self {
        Self { phase: Phase::Idle }
    }
}

impl RenderCycle {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        log::info!("Render {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Run one cycle. The panel is powered down even when drawing or the
    /// commit failed; the first error is returned.
    pub fn run<P: Panel>(&mut self, panel: &mut P, frame: &Frame) -> Result<()> {
        let result = self.prepare_and_commit(panel, frame);
        if let Err(e) = &result {
            log::error!("Render failed in {:?}: {}", self.phase, e);
        }

        let powered_down = panel.power_down();
        if powered_down.is_ok() {
            self.enter(Phase::PoweredDown);
        }
        result.and(powered_down)
    }

    fn prepare_and_commit<P: Panel>(&mut self, panel: &mut P, frame: &Frame) -> Result<()> {
        self.enter(Phase::Preparing);
        panel.clear()?;

        self.enter(Phase::Drawing);
        panel.draw(frame)?;

        self.enter(Phase::Committing);
        panel.commit()
    }
}
