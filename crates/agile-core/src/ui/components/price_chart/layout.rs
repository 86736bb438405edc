//! Chart geometry: where every dot, grid row and hour marker goes
//!
//! Layout is computed separately from drawing so it can be checked in tests
//! without a display.

use alloc::vec::Vec;
use core::fmt::Write;

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::String;

use super::ChartError;
use super::constants::{
    DOT_RADIUS_DENOMINATOR, DOT_RADIUS_NUMERATOR, HOUR_LABEL_GAP_PX, HOUR_MARKER_INTERVAL_HOURS,
    LABEL_GAP_PX, MIN_DOT_RADIUS_PX,
};
use super::scale::{GridRow, PriceScale};
use crate::config::PriceBands;
use crate::metrics::slot_color;
use crate::tariff::{PriceSlot, SLOTS_PER_DAY};
use crate::ui::styling::FONT_6X10_CHAR_HEIGHT_PX;
use crate::ui::{DISPLAY_WIDTH_PX, SCREEN_MARGIN_PX};

/// Plot top edge on the standard screen, below the clock
const PLOT_TOP_PX: i32 = 42;
/// Plot height on the standard screen
const PLOT_HEIGHT_PX: u32 = 138;
/// Width of the grid label column to the right of the plot
const LABEL_COLUMN_WIDTH_PX: i32 = 24;

/// Where the chart sits on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartGeometry {
    /// Area dots and grid lines are drawn in
    pub plot: Rectangle,
    /// Left edge of the grid labels
    pub label_x: i32,
    /// Top edge of the hour labels
    pub hour_label_y: i32,
}

impl ChartGeometry {
    pub fn new(plot: Rectangle) -> Self {
        let right = plot.top_left.x + plot.size.width as i32;
        let bottom = plot.top_left.y + plot.size.height as i32;
        Self {
            plot,
            label_x: right + LABEL_GAP_PX,
            hour_label_y: bottom + HOUR_LABEL_GAP_PX,
        }
    }

    /// Bottom edge of the hour labels
    pub fn bottom(&self) -> i32 {
        self.hour_label_y + FONT_6X10_CHAR_HEIGHT_PX as i32
    }
}

impl Default for ChartGeometry {
    /// Full-width chart between the clock and the price row
    fn default() -> Self {
        let width = DISPLAY_WIDTH_PX as i32 - 2 * SCREEN_MARGIN_PX - LABEL_COLUMN_WIDTH_PX;
        Self::new(Rectangle::new(
            Point::new(SCREEN_MARGIN_PX, PLOT_TOP_PX),
            Size::new(width as u32, PLOT_HEIGHT_PX),
        ))
    }
}

/// One price dot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDot {
    pub center: Point,
    pub color: Rgb565,
}

/// Vertical marker at the start of a 3-hourly slot
#[derive(Debug, Clone, PartialEq)]
pub struct HourMarker {
    pub x: i32,
    pub label: String<2>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub geometry: ChartGeometry,
    pub scale: PriceScale,
    pub dot_radius: u32,
    pub dots: Vec<ChartDot>,
    pub grid: Vec<GridRow>,
    pub hours: Vec<HourMarker>,
}

impl ChartLayout {
    /// Lay out `window` (oldest slot first) for drawing at `now`.
    pub fn compute(
        window: &[PriceSlot],
        now: DateTime<Utc>,
        tz: Tz,
        geometry: &ChartGeometry,
        bands: &PriceBands,
    ) -> Result<Self, ChartError> {
        if geometry.plot.size.width == 0 || geometry.plot.size.height == 0 {
            return Err(ChartError::InvalidGeometry);
        }

        let scale = PriceScale::from_prices(
            window.iter().map(|s| s.price),
            geometry.plot.top_left.y,
            geometry.plot.size.height,
        )
        .ok_or(ChartError::NoData)?;

        // A day fills the plot; two days share it at half the pitch
        let mut pitch = geometry.plot.size.width as f32 / SLOTS_PER_DAY as f32;
        if window.len() > SLOTS_PER_DAY {
            pitch /= 2.0;
        }
        let dot_radius = ((pitch * DOT_RADIUS_NUMERATOR as f32) / DOT_RADIUS_DENOMINATOR as f32)
            as u32;
        let dot_radius = dot_radius.max(MIN_DOT_RADIUS_PX);

        let left = geometry.plot.top_left.x;
        let mut dots = Vec::with_capacity(window.len());
        let mut hours = Vec::new();

        for (i, slot) in window.iter().enumerate() {
            let x = left + (i as f32 * pitch) as i32;

            let local = slot.start.with_timezone(&tz);
            if local.hour() % HOUR_MARKER_INTERVAL_HOURS == 0 && local.minute() == 0 {
                let mut label = String::new();
                let _ = write!(label, "{:02}", local.hour());
                hours.push(HourMarker { x, label });
            }

            dots.push(ChartDot {
                center: Point::new(x, scale.y_for(slot.price)),
                color: slot_color(slot.price, slot.is_past(now), bands),
            });
        }

        Ok(Self {
            geometry: *geometry,
            scale,
            dot_radius,
            dots,
            grid: scale.grid_rows().collect(),
            hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::styling::{GREY, GREEN, RED};
    use chrono::{TimeDelta, TimeZone};

    fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, m, 0).unwrap()
    }

    fn day_from(start: DateTime<Utc>, count: usize, price: impl Fn(usize) -> f32) -> Vec<PriceSlot> {
        (0..count)
            .map(|i| {
                let s = start + TimeDelta::minutes(30 * i as i64);
                PriceSlot {
                    start: s,
                    end: s + TimeDelta::minutes(30),
                    price: price(i),
                }
            })
            .collect()
    }

    fn geometry() -> ChartGeometry {
        ChartGeometry::new(Rectangle::new(Point::new(8, 40), Size::new(288, 150)))
    }

    #[test]
    fn test_default_geometry_fits_screen() {
        let g = ChartGeometry::default();
        assert_eq!(g.plot.size.width, 280);
        assert!(g.label_x + 20 <= DISPLAY_WIDTH_PX as i32);
        assert!(g.bottom() < 200);
    }

    #[test]
    fn test_single_day_pitch_and_radius() {
        let window = day_from(utc(14, 23, 0), 48, |_| 10.0);
        let layout =
            ChartLayout::compute(&window, utc(15, 12, 0), Tz::UTC, &geometry(), &PriceBands::default())
                .unwrap();
        assert_eq!(layout.dots.len(), 48);
        assert_eq!(layout.dots[0].center.x, 8);
        assert_eq!(layout.dots[1].center.x, 14);
        assert_eq!(layout.dots[47].center.x, 8 + 47 * 6);
        assert_eq!(layout.dot_radius, 2);
    }

    #[test]
    fn test_two_days_halve_pitch() {
        let window = day_from(utc(14, 23, 0), 96, |_| 10.0);
        let layout =
            ChartLayout::compute(&window, utc(15, 18, 0), Tz::UTC, &geometry(), &PriceBands::default())
                .unwrap();
        assert_eq!(layout.dots[1].center.x, 11);
        assert_eq!(layout.dots[95].center.x, 8 + 95 * 3);
        assert_eq!(layout.dot_radius, 1);
    }

    #[test]
    fn test_past_slots_are_grey() {
        let window = day_from(utc(15, 11, 0), 4, |i| [5.0, 5.0, 40.0, 5.0][i]);
        let layout =
            ChartLayout::compute(&window, utc(15, 12, 10), Tz::UTC, &geometry(), &PriceBands::default())
                .unwrap();
        // 11:00 and 11:30 have ended; 12:00 is current
        assert_eq!(layout.dots[0].color, GREY);
        assert_eq!(layout.dots[1].color, GREY);
        assert_eq!(layout.dots[2].color, RED);
        assert_eq!(layout.dots[3].color, GREEN);
    }

    #[test]
    fn test_dots_follow_scale() {
        let window = day_from(utc(15, 0, 0), 3, |i| [-10.0, 0.0, 40.0][i]);
        let g = geometry();
        let layout =
            ChartLayout::compute(&window, utc(15, 0, 0), Tz::UTC, &g, &PriceBands::default()).unwrap();
        assert_eq!(layout.dots[2].center.y, g.plot.top_left.y);
        assert_eq!(
            layout.dots[0].center.y,
            g.plot.top_left.y + g.plot.size.height as i32
        );
        assert_eq!(layout.dots[1].center.y, layout.scale.y_for(0.0));
    }

    #[test]
    fn test_hour_markers_every_three_local_hours() {
        // 48 slots from 23:00Z: markers at 00, 03, ... 21
        let window = day_from(utc(14, 23, 0), 48, |_| 10.0);
        let layout =
            ChartLayout::compute(&window, utc(15, 12, 0), Tz::UTC, &geometry(), &PriceBands::default())
                .unwrap();
        let labels: Vec<&str> = layout.hours.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, ["00", "03", "06", "09", "12", "15", "18", "21"]);
        // 00:00 is the third slot
        assert_eq!(layout.hours[0].x, layout.dots[2].center.x);
    }

    #[test]
    fn test_hour_markers_use_local_time() {
        // In BST 23:00Z is 00:00 local, so the first slot gets a marker
        let start = Utc.with_ymd_and_hms(2024, 6, 14, 23, 0, 0).unwrap();
        let window = day_from(start, 6, |_| 10.0);
        let layout = ChartLayout::compute(
            &window,
            start,
            Tz::Europe__London,
            &geometry(),
            &PriceBands::default(),
        )
        .unwrap();
        assert_eq!(layout.hours.len(), 1);
        assert_eq!(layout.hours[0].label.as_str(), "00");
        assert_eq!(layout.hours[0].x, 8);
    }

    #[test]
    fn test_empty_window_is_error() {
        assert_eq!(
            ChartLayout::compute(&[], utc(15, 0, 0), Tz::UTC, &geometry(), &PriceBands::default()),
            Err(ChartError::NoData)
        );
    }

    #[test]
    fn test_zero_sized_plot_is_error() {
        let window = day_from(utc(15, 0, 0), 3, |_| 1.0);
        let g = ChartGeometry::new(Rectangle::new(Point::zero(), Size::new(0, 100)));
        assert_eq!(
            ChartLayout::compute(&window, utc(15, 0, 0), Tz::UTC, &g, &PriceBands::default()),
            Err(ChartError::InvalidGeometry)
        );
    }
}
