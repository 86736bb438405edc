pub mod price_chart;

pub use price_chart::{ChartError, ChartGeometry, ChartLayout, PriceScale, draw_chart};
