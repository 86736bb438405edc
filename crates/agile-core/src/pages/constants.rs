//! Shared layout constants for pages
//!
//! All positions are text baselines on the 320x240 landscape panel.

/// Clock baseline, top centre
pub const CLOCK_BASELINE_Y: i32 = 32;

/// Previous, current and next price baseline
pub const PRICE_ROW_BASELINE_Y: i32 = 232;

/// First start-up log line
pub const STARTUP_FIRST_BASELINE_Y: i32 = 30;

/// Distance between start-up log lines
pub const STARTUP_LINE_SPACING_PX: i32 = 24;

/// Start-up log capacity, including the initial line
pub const STARTUP_MAX_LINES: usize = 8;

/// Distance between the lines of the error page
pub const ERROR_LINE_SPACING_PX: i32 = 24;

/// Error page message capacity
pub const ERROR_MESSAGE_LEN: usize = 64;
