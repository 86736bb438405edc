//! Drawing a computed [`ChartLayout`]

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use super::constants::{
    GRID_LABEL_COLOR, GRID_LINE_COLOR, HOUR_LABEL_COLOR, HOUR_MARKER_COLOR, ZERO_LINE_COLOR,
};
use super::layout::ChartLayout;
use crate::ui::styling::{axis_label_style, hour_label_style};

/// Draw grid rows and labels, then hour markers, then dots on top.
pub fn draw_chart<D>(layout: &ChartLayout, display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let plot = layout.geometry.plot;
    let left = plot.top_left.x;
    let right = left + plot.size.width as i32 - 1;
    let top = plot.top_left.y;
    let bottom = top + plot.size.height as i32 - 1;

    let middle_left = TextStyleBuilder::new()
        .alignment(Alignment::Left)
        .baseline(Baseline::Middle)
        .build();
    for row in &layout.grid {
        let color = if row.is_zero() {
            ZERO_LINE_COLOR
        } else {
            GRID_LINE_COLOR
        };
        Line::new(Point::new(left, row.y), Point::new(right, row.y))
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(display)?;

        Text::with_text_style(
            &row.label,
            Point::new(layout.geometry.label_x, row.y),
            axis_label_style(GRID_LABEL_COLOR),
            middle_left,
        )
        .draw(display)?;
    }

    let top_center = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Top)
        .build();
    for marker in &layout.hours {
        Line::new(Point::new(marker.x, top), Point::new(marker.x, bottom))
            .into_styled(PrimitiveStyle::with_stroke(HOUR_MARKER_COLOR, 1))
            .draw(display)?;

        Text::with_text_style(
            &marker.label,
            Point::new(marker.x, layout.geometry.hour_label_y),
            hour_label_style(HOUR_LABEL_COLOR),
            top_center,
        )
        .draw(display)?;
    }

    let diameter = 2 * layout.dot_radius + 1;
    for dot in &layout.dots {
        Circle::with_center(dot.center, diameter)
            .into_styled(PrimitiveStyle::with_fill(dot.color))
            .draw(display)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PriceBands;
    use crate::framebuffer::FrameBuffer;
    use crate::tariff::PriceSlot;
    use crate::ui::components::price_chart::{ChartGeometry, ChartLayout};
    use crate::ui::styling::{BLACK, GREEN};
    use alloc::vec::Vec;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use chrono_tz::Tz;
    use embedded_graphics::primitives::Rectangle;

    fn slots(start: DateTime<Utc>, prices: &[f32]) -> Vec<PriceSlot> {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let s = start + TimeDelta::minutes(30 * i as i64);
                PriceSlot {
                    start: s,
                    end: s + TimeDelta::minutes(30),
                    price: *p,
                }
            })
            .collect()
    }

    #[test]
    fn test_draws_grid_markers_and_dots() {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let window = slots(start, &[5.0, 15.0, 25.0]);
        let geometry = ChartGeometry::new(Rectangle::new(Point::new(8, 40), Size::new(288, 150)));
        let layout =
            ChartLayout::compute(&window, start, Tz::UTC, &geometry, &PriceBands::default())
                .unwrap();

        let mut fb = FrameBuffer::new();
        draw_chart(&layout, &mut fb).unwrap();

        // Zero line, away from dots and markers
        let zero_y = layout.scale.y_for(0.0);
        assert_eq!(fb.pixel(200, zero_y), Some(ZERO_LINE_COLOR));
        // A 10p row
        let ten_y = layout.scale.y_for(10.0);
        assert_eq!(fb.pixel(200, ten_y), Some(GRID_LINE_COLOR));
        // 12:00 marker runs the full plot height
        assert_eq!(fb.pixel(8, 41), Some(HOUR_MARKER_COLOR));
        // First dot is cheap and current
        let dot = layout.dots[0].center;
        assert_eq!(fb.pixel(dot.x, dot.y), Some(GREEN));
        // Nothing drawn above the plot
        assert_eq!(fb.pixel(200, 20), Some(BLACK));
    }
}
