//! Main price page
//!
//! Layout, top to bottom:
//! - local time, centred
//! - the price chart with its grid labels on the right and hour labels below
//! - previous, current and next slot prices in their band colours, with the
//!   current price largest

use alloc::boxed::Box;
use core::fmt::Write;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::{debug, warn};
use u8g2_fonts::types::HorizontalAlignment;

use crate::clock::format_clock;
use crate::config::PriceBands;
use crate::metrics::PriceLevel;
use crate::pages::Page;
use crate::pages::constants::{CLOCK_BASELINE_Y, PRICE_ROW_BASELINE_Y};
use crate::tariff::{PriceSet, SurroundingPrices};
use crate::ui::components::price_chart::{ChartGeometry, ChartLayout, draw_chart};
use crate::ui::core::{Drawable, PageEvent, PageId};
use crate::ui::styling::{BLACK, FontSize, GREY, WHITE, draw_text};
use crate::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, SCREEN_MARGIN_PX};

/// "-12.3p" and the like
type PriceText = heapless::String<12>;

pub struct PricesPage {
    timezone: Tz,
    bands: PriceBands,
    geometry: ChartGeometry,
    prices: Option<Box<PriceSet>>,
    now: Option<DateTime<Utc>>,
    dirty: bool,
}

impl PricesPage {
    pub fn new(timezone: Tz, bands: PriceBands) -> Self {
        Self {
            timezone,
            bands,
            geometry: ChartGeometry::default(),
            prices: None,
            now: None,
            dirty: true,
        }
    }

    /// Start with prices and time already known, e.g. when navigating back.
    pub fn with_state(mut self, prices: Option<Box<PriceSet>>, now: Option<DateTime<Utc>>) -> Self {
        self.prices = prices;
        self.now = now;
        self
    }

    pub fn surrounding(&self) -> SurroundingPrices {
        match (&self.prices, self.now) {
            (Some(prices), Some(now)) => prices.surrounding(now),
            _ => SurroundingPrices::default(),
        }
    }

    fn draw_clock<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let text = match self.now {
            Some(now) => format_clock(now, self.timezone),
            None => heapless::String::try_from("--:--").unwrap_or_default(),
        };
        draw_text(
            FontSize::Clock,
            &text,
            Point::new(DISPLAY_WIDTH_PX as i32 / 2, CLOCK_BASELINE_Y),
            HorizontalAlignment::Center,
            GREY,
            display,
        )?;
        Ok(())
    }

    /// Chart, or a placeholder while there is nothing to plot
    fn draw_chart_area<D: DrawTarget<Color = Rgb565>>(
        &self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        if let (Some(prices), Some(now)) = (&self.prices, self.now) {
            let window = prices.chart_window(now, self.timezone);
            match ChartLayout::compute(window, now, self.timezone, &self.geometry, &self.bands) {
                Ok(layout) => {
                    debug!(
                        "Chart: {} slots, {}p..{}p",
                        layout.dots.len(),
                        layout.scale.bottom * 10,
                        layout.scale.top * 10
                    );
                    return draw_chart(&layout, display);
                }
                Err(e) => warn!("Chart not drawn: {}", e),
            }
        }

        let plot = self.geometry.plot;
        draw_text(
            FontSize::Body,
            "Waiting for prices",
            plot.center(),
            HorizontalAlignment::Center,
            WHITE,
            display,
        )?;
        Ok(())
    }

    fn draw_price_row<D: DrawTarget<Color = Rgb565>>(
        &self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        let prices = self.surrounding();
        let row = [
            (
                prices.previous,
                FontSize::Secondary,
                SCREEN_MARGIN_PX,
                HorizontalAlignment::Left,
            ),
            (
                prices.current,
                FontSize::Hero,
                DISPLAY_WIDTH_PX as i32 / 2,
                HorizontalAlignment::Center,
            ),
            (
                prices.next,
                FontSize::Secondary,
                DISPLAY_WIDTH_PX as i32 - SCREEN_MARGIN_PX,
                HorizontalAlignment::Right,
            ),
        ];

        for (price, size, x, alignment) in row {
            draw_text(
                size,
                &format_price(price),
                Point::new(x, PRICE_ROW_BASELINE_Y),
                alignment,
                PriceLevel::assess(price, &self.bands).color(),
                display,
            )?;
        }
        Ok(())
    }
}

/// One decimal place and a `p` suffix
pub fn format_price(price: f32) -> PriceText {
    let mut text = PriceText::new();
    let _ = write!(text, "{:.1}p", price);
    text
}

impl Page for PricesPage {
    fn id(&self) -> PageId {
        PageId::Prices
    }

    fn title(&self) -> &str {
        "Prices"
    }

    fn on_event(&mut self, event: &PageEvent) -> bool {
        match event {
            PageEvent::PricesUpdated(prices) => {
                self.prices = Some(prices.clone());
                self.dirty = true;
                true
            }
            PageEvent::Tick(now) => {
                self.now = Some(*now);
                self.dirty = true;
                true
            }
            PageEvent::Startup(_) => false,
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

impl Drawable for PricesPage {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        display.clear(BLACK)?;
        self.draw_chart_area(display)?;
        self.draw_clock(display)?;
        self.draw_price_row(display)
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
    use crate::tariff::PriceSlot;
    use crate::ui::styling::RED;
    use alloc::vec::Vec;
    use chrono::{TimeDelta, TimeZone};

    fn sample_prices(start: DateTime<Utc>) -> Box<PriceSet> {
        let slots: Vec<PriceSlot> = (0..48)
            .map(|i| {
                let s = start + TimeDelta::minutes(30 * i);
                PriceSlot {
                    start: s,
                    end: s + TimeDelta::minutes(30),
                    price: if i == 26 { 42.5 } else { 12.0 + i as f32 / 10.0 },
                }
            })
            .collect();
        Box::new(PriceSet::from_slots(slots))
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(15.749).as_str(), "15.7p");
        assert_eq!(format_price(-2.1).as_str(), "-2.1p");
        assert_eq!(format_price(0.0).as_str(), "0.0p");
    }

    #[test]
    fn test_events_mark_dirty() {
        let mut page = PricesPage::new(Tz::Europe__London, PriceBands::default());
        Page::mark_clean(&mut page);
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert!(page.on_event(&PageEvent::Tick(now)));
        assert!(Page::is_dirty(&page));
        Page::mark_clean(&mut page);
        assert!(page.on_event(&PageEvent::PricesUpdated(sample_prices(now))));
        assert!(Page::is_dirty(&page));
    }

    #[test]
    fn test_surrounding_needs_time_and_prices() {
        let start = Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap();
        let page = PricesPage::new(Tz::Europe__London, PriceBands::default())
            .with_state(Some(sample_prices(start)), None);
        assert_eq!(page.surrounding(), SurroundingPrices::default());

        // Slot 26 starts 12:00Z
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 10, 0).unwrap();
        let page = page.with_state(Some(sample_prices(start)), Some(now));
        let prices = page.surrounding();
        assert_eq!(prices.current, 42.5);
        assert_eq!(prices.previous, 12.0 + 25.0 / 10.0);
    }

    #[test]
    fn test_draws_peak_price_in_red() {
        let start = Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 10, 0).unwrap();
        let mut page = PricesPage::new(Tz::Europe__London, PriceBands::default())
            .with_state(Some(sample_prices(start)), Some(now));
        let mut fb = FrameBuffer::new();
        page.draw_page(&mut fb).unwrap();

        // The hero price sits centred on the bottom row
        let centre_x = DISPLAY_WIDTH_PX as i32 / 2;
        let red_in_row = (PRICE_ROW_BASELINE_Y - 30..PRICE_ROW_BASELINE_Y)
            .flat_map(|y| (centre_x - 50..centre_x + 50).map(move |x| (x, y)))
            .any(|(x, y)| fb.pixel(x, y) == Some(RED));
        assert!(red_in_row);
    }

    #[test]
    fn test_draws_placeholder_without_prices() {
        let mut page = PricesPage::new(Tz::Europe__London, PriceBands::default());
        let mut fb = FrameBuffer::new();
        page.draw_page(&mut fb).unwrap();
        let centre = ChartGeometry::default().plot.center();
        let white_near_centre = (centre.y - 16..centre.y)
            .flat_map(|y| (centre.x - 60..centre.x + 60).map(move |x| (x, y)))
            .any(|(x, y)| fb.pixel(x, y) == Some(WHITE));
        assert!(white_near_centre);
    }
}
