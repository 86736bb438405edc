//! Start-up page
//!
//! A plain log of boot milestones, one line per step, in the order they
//! happen.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::Vec;
use log::warn;
use u8g2_fonts::types::HorizontalAlignment;

use crate::pages::Page;
use crate::pages::constants::{
    STARTUP_FIRST_BASELINE_Y, STARTUP_LINE_SPACING_PX, STARTUP_MAX_LINES,
};
use crate::ui::core::{Drawable, PageEvent, PageId, StartupStep};
use crate::ui::styling::{BLACK, DARK_GREY, ERROR_RED, FontSize, draw_text};
use crate::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, SCREEN_MARGIN_PX};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogLine {
    pub text: &'static str,
    pub color: Rgb565,
}

impl From<StartupStep> for LogLine {
    fn from(step: StartupStep) -> Self {
        let (text, color) = match step {
            StartupStep::WifiConnected => ("WiFi connected", DARK_GREY),
            StartupStep::TimeSynced => ("NTP done", DARK_GREY),
            StartupStep::TimeSyncFailed => ("NTP issue", ERROR_RED),
            StartupStep::PricesFetched => ("Agile prices fetched", DARK_GREY),
        };
        Self { text, color }
    }
}

pub struct StartupPage {
    lines: Vec<LogLine, STARTUP_MAX_LINES>,
    dirty: bool,
}

impl StartupPage {
    pub fn new() -> Self {
        let mut lines = Vec::new();
        let _ = lines.push(LogLine {
            text: "Starting up",
            color: DARK_GREY,
        });
        Self { lines, dirty: true }
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn push_step(&mut self, step: StartupStep) {
        if self.lines.push(step.into()).is_err() {
            warn!("Start-up log full, dropping {:?}", step);
            return;
        }
        self.dirty = true;
    }
}

impl Default for StartupPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for StartupPage {
    fn id(&self) -> PageId {
        PageId::Startup
    }

    fn title(&self) -> &str {
        "Startup"
    }

    fn on_event(&mut self, event: &PageEvent) -> bool {
        match event {
            PageEvent::Startup(step) => {
                self.push_step(*step);
                true
            }
            _ => false,
        }
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

impl Drawable for StartupPage {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        display.clear(BLACK)?;

        for (i, line) in self.lines.iter().enumerate() {
            let y = STARTUP_FIRST_BASELINE_Y + i as i32 * STARTUP_LINE_SPACING_PX;
            draw_text(
                FontSize::Body,
                line.text,
                Point::new(SCREEN_MARGIN_PX, y),
                HorizontalAlignment::Left,
                line.color,
                display,
            )?;
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;

    #[test]
    fn test_steps_append_lines() {
        let mut page = StartupPage::new();
        Page::mark_clean(&mut page);
        assert!(page.on_event(&PageEvent::Startup(StartupStep::WifiConnected)));
        assert!(page.on_event(&PageEvent::Startup(StartupStep::TimeSyncFailed)));
        assert!(Page::is_dirty(&page));

        let texts: heapless::Vec<&str, 8> = page.lines().iter().map(|l| l.text).collect();
        assert_eq!(texts.as_slice(), ["Starting up", "WiFi connected", "NTP issue"]);
        assert_eq!(page.lines()[2].color, ERROR_RED);
    }

    #[test]
    fn test_ignores_other_events() {
        let mut page = StartupPage::new();
        let now = chrono::DateTime::from_timestamp(0, 0).unwrap();
        assert!(!page.on_event(&PageEvent::Tick(now)));
    }

    #[test]
    fn test_full_log_drops_extra_steps() {
        let mut page = StartupPage::new();
        for _ in 0..20 {
            page.push_step(StartupStep::WifiConnected);
        }
        assert_eq!(page.lines().len(), STARTUP_MAX_LINES);
    }

    #[test]
    fn test_draws_log_text() {
        let mut page = StartupPage::new();
        let mut fb = FrameBuffer::new();
        page.draw_page(&mut fb).unwrap();
        let drawn = fb.dirty_area().unwrap();
        assert!(drawn.top_left.y < STARTUP_FIRST_BASELINE_Y);
        assert!(drawn.top_left.x >= SCREEN_MARGIN_PX);
    }
}
