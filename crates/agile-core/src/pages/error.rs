//! Error page
//!
//! Shown when start-up cannot continue, e.g. WiFi never connects. The message
//! comes from the [`AppError`] and is wrapped to fit the screen.

use embedded_graphics::{
    Drawable as EgDrawable,
    pixelcolor::Rgb565,
    prelude::*,
    primitives::Rectangle,
    text::{Alignment, Text},
};
use heapless::{String, Vec};
use u8g2_fonts::types::HorizontalAlignment;

use crate::app_state::{AppError, error_message};
use crate::pages::Page;
use crate::pages::constants::{ERROR_LINE_SPACING_PX, ERROR_MESSAGE_LEN};
use crate::ui::core::{Drawable, PageId};
use crate::ui::styling::{
    BLACK, ERROR_RED, FONT_6X10_CHAR_HEIGHT_PX, FONT_6X10_CHAR_WIDTH_PX, FontSize, LABEL_GREY,
    WHITE, draw_text, hour_label_style,
};
use crate::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, SCREEN_MARGIN_PX};

/// Characters of the message font that fit between the margins
const LINE_CHARS: usize =
    (DISPLAY_WIDTH_PX as usize - 2 * SCREEN_MARGIN_PX as usize) / FONT_6X10_CHAR_WIDTH_PX as usize;

const MAX_MESSAGE_LINES: usize = 3;

pub struct ErrorPage {
    message: String<ERROR_MESSAGE_LEN>,
    hint: &'static str,
    dirty: bool,
}

impl ErrorPage {
    pub fn new(message: &str, hint: &'static str) -> Self {
        let mut text = String::new();
        for c in message.chars() {
            if text.push(c).is_err() {
                break;
            }
        }
        Self {
            message: text,
            hint,
            dirty: true,
        }
    }

    pub fn from_error(error: &AppError) -> Self {
        let hint = match error {
            AppError::Wifi(_) => "Check WiFi credentials",
            AppError::TimeSync(_) => "Check NTP server",
            AppError::Http(_) | AppError::Tariff(_) => "Check tariff settings",
            AppError::Display(_) => "Restart the device",
        };
        let message: String<ERROR_MESSAGE_LEN> = error_message(&DisplayAsDebug(error));
        Self::new(&message, hint)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn hint(&self) -> &str {
        self.hint
    }

    /// Message split at spaces into lines that fit the screen
    pub fn message_lines(&self) -> Vec<&str, MAX_MESSAGE_LINES> {
        let mut lines = Vec::new();
        let mut rest = self.message.as_str().trim();

        while !rest.is_empty() {
            let split = if rest.len() <= LINE_CHARS {
                rest.len()
            } else {
                let cut = floor_char_boundary(rest, LINE_CHARS);
                rest[..cut].rfind(' ').filter(|&i| i > 0).unwrap_or(cut)
            };
            if lines.push(rest[..split].trim_end()).is_err() {
                break;
            }
            rest = rest[split..].trim_start();
        }
        lines
    }
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Routes the error's `Display` text through [`error_message`]
struct DisplayAsDebug<'a>(&'a AppError);

impl core::fmt::Debug for DisplayAsDebug<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(self.0, f)
    }
}

impl Page for ErrorPage {
    fn id(&self) -> PageId {
        PageId::Error
    }

    fn title(&self) -> &str {
        "Error"
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        Drawable::draw(self, display)
    }

    fn bounds(&self) -> Rectangle {
        Drawable::bounds(self)
    }

    fn is_dirty(&self) -> bool {
        Drawable::is_dirty(self)
    }

    fn mark_clean(&mut self) {
        Drawable::mark_clean(self)
    }

    fn mark_dirty(&mut self) {
        Drawable::mark_dirty(self)
    }
}

impl Drawable for ErrorPage {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        display.clear(BLACK)?;

        let center_x = DISPLAY_WIDTH_PX as i32 / 2;
        let center_y = DISPLAY_HEIGHT_PX as i32 / 2;

        draw_text(
            FontSize::Body,
            "Error",
            Point::new(center_x, center_y - ERROR_LINE_SPACING_PX * 2),
            HorizontalAlignment::Center,
            ERROR_RED,
            display,
        )?;

        let lines = self.message_lines();
        let mut y = center_y - ERROR_LINE_SPACING_PX;
        for line in &lines {
            EgDrawable::draw(
                &Text::with_alignment(
                    line,
                    Point::new(center_x, y),
                    hour_label_style(WHITE),
                    Alignment::Center,
                ),
                display,
            )?;
            y += FONT_6X10_CHAR_HEIGHT_PX as i32 + 4;
        }

        draw_text(
            FontSize::Body,
            self.hint,
            Point::new(center_x, center_y + ERROR_LINE_SPACING_PX * 2),
            HorizontalAlignment::Center,
            LABEL_GREY,
            display,
        )?;
        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(
            Point::zero(),
            Size::new(DISPLAY_WIDTH_PX as u32, DISPLAY_HEIGHT_PX as u32),
        )
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
