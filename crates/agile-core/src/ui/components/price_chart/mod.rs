//! Half-hourly price dot chart
//!
//! The chart plots one dot per price slot against horizontal 10p grid rows,
//! with the 0p row drawn brighter, a label column on the right and a
//! vertical marker with an `HH` label every three local hours. Dots take
//! their price band colour, or grey once the slot is over.
//!
//! [`ChartLayout::compute`] works out every position and colour;
//! [`draw_chart`] renders a layout with embedded-graphics primitives.
//!
//! ```ignore
//! let window = prices.chart_window(now, tz);
//! let layout = ChartLayout::compute(window, now, tz, &ChartGeometry::default(), &bands)?;
//! draw_chart(&layout, &mut display)?;
//! ```

use thiserror_no_std::Error;

pub mod constants;
mod layout;
mod render;
mod scale;

pub use layout::{ChartDot, ChartGeometry, ChartLayout, HourMarker};
pub use render::draw_chart;
pub use scale::{GridRow, PriceScale};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChartError {
    /// Nothing to plot
    #[error("No price data to chart")]
    NoData,

    /// Plot area has no width or height
    #[error("Chart plot area is empty")]
    InvalidGeometry,
}
