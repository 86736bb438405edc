//! Constants for price chart rendering

use embedded_graphics::pixelcolor::Rgb565;

use crate::ui::styling::{DARK_GREY, GREY, LABEL_GREY};

/// Pence between horizontal grid lines
pub const GRID_STEP_PENCE: i32 = 10;

/// The scale always reaches down to at least this price so the zero line
/// and one negative row are visible
pub const SCALE_FLOOR_PENCE: f32 = -10.0;

/// Dot radius as a fraction of slot pitch
pub const DOT_RADIUS_NUMERATOR: u32 = 4;
pub const DOT_RADIUS_DENOMINATOR: u32 = 9;

/// Smallest dot radius in pixels
pub const MIN_DOT_RADIUS_PX: u32 = 1;

/// Hour markers are drawn on local hours divisible by this
pub const HOUR_MARKER_INTERVAL_HOURS: u32 = 3;

/// Gap between the plot's right edge and the grid labels
pub const LABEL_GAP_PX: i32 = 4;

/// Gap between the plot's bottom edge and the top of the hour labels
pub const HOUR_LABEL_GAP_PX: i32 = 3;

/// Longest grid label, e.g. "-100p"
pub const MAX_GRID_LABEL_LEN: usize = 8;

pub const GRID_LINE_COLOR: Rgb565 = DARK_GREY;
pub const ZERO_LINE_COLOR: Rgb565 = GREY;
pub const GRID_LABEL_COLOR: Rgb565 = LABEL_GREY;
pub const HOUR_MARKER_COLOR: Rgb565 = DARK_GREY;
pub const HOUR_LABEL_COLOR: Rgb565 = LABEL_GREY;
