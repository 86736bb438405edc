//! UI building blocks for the price display
//!
//! - Core types shared by pages (touch points, page ids, page events)
//! - Colours and fonts
//! - The price chart component

pub mod components;
pub mod core;
pub mod styling;

pub use self::core::{Drawable, PageEvent, PageId, StartupStep, TouchEvent, TouchPoint};
pub use styling::*;

/// Panel width in landscape orientation
pub const DISPLAY_WIDTH_PX: u16 = 320;

/// Panel height in landscape orientation
pub const DISPLAY_HEIGHT_PX: u16 = 240;

/// Gap kept clear around the screen edge
pub const SCREEN_MARGIN_PX: i32 = 8;
