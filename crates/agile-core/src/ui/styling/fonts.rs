//! Font selection and text rendering helpers
//!
//! Axis labels use the embedded-graphics mono fonts. Everything that has to
//! be read from across a room (clock, prices) uses scalable-looking u8g2
//! fonts rendered through [`FontRenderer`].

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::{FONT_5X8, FONT_6X10};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::warn;
use u8g2_fonts::types::{FontColor, HorizontalAlignment, VerticalPosition};
use u8g2_fonts::{FontRenderer, fonts};

/// Character cell of [`FONT_5X8`]
pub const FONT_5X8_CHAR_WIDTH_PX: u32 = 5;
pub const FONT_5X8_CHAR_HEIGHT_PX: u32 = 8;

/// Character cell of [`FONT_6X10`]
pub const FONT_6X10_CHAR_WIDTH_PX: u32 = 6;
pub const FONT_6X10_CHAR_HEIGHT_PX: u32 = 10;

/// Text sizes used across the pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSize {
    /// Start-up log lines and error hints
    Body,
    /// Previous and next slot prices
    Secondary,
    /// Clock
    Clock,
    /// Current price
    Hero,
}

impl FontSize {
    pub fn renderer(self) -> FontRenderer {
        match self {
            FontSize::Body => FontRenderer::new::<fonts::u8g2_font_helvB14_tr>(),
            FontSize::Secondary => FontRenderer::new::<fonts::u8g2_font_logisoso20_tr>(),
            FontSize::Clock => FontRenderer::new::<fonts::u8g2_font_logisoso24_tr>(),
            FontSize::Hero => FontRenderer::new::<fonts::u8g2_font_logisoso32_tr>(),
        }
    }
}

/// Mono style for grid labels
pub fn axis_label_style(color: Rgb565) -> MonoTextStyle<'static, Rgb565> {
    MonoTextStyle::new(&FONT_5X8, color)
}

/// Mono style for hour markers under the chart
pub fn hour_label_style(color: Rgb565) -> MonoTextStyle<'static, Rgb565> {
    MonoTextStyle::new(&FONT_6X10, color)
}

/// Draw `text` with a u8g2 font anchored at `position` on its baseline.
///
/// Missing glyphs are logged and skipped; only display errors propagate.
/// Returns the drawn bounding box, if anything was drawn.
pub fn draw_text<D>(
    size: FontSize,
    text: &str,
    position: Point,
    alignment: HorizontalAlignment,
    color: Rgb565,
    display: &mut D,
) -> Result<Option<Rectangle>, D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    match size.renderer().render_aligned(
        text,
        position,
        VerticalPosition::Baseline,
        alignment,
        FontColor::Transparent(color),
        display,
    ) {
        Ok(bounds) => Ok(bounds),
        Err(u8g2_fonts::Error::DisplayError(e)) => Err(e),
        Err(_) => {
            warn!("Text {:?} could not be rendered", text);
            Ok(None)
        }
    }
}
