//! Colour definitions
//!
//! The display is RGB565. Colours are written as 8-bit RGB and converted
//! with R>>3, G>>2, B>>3 so they read the same as in design notes.

use embedded_graphics::pixelcolor::Rgb565;

// ============================================================================
// Neutral tones
// ============================================================================

/// Screen background
pub const BLACK: Rgb565 = Rgb565::new(0, 0, 0);

/// Soft white for labels, never full brightness
pub const WHITE: Rgb565 = Rgb565::new(200 >> 3, 200 >> 2, 200 >> 3);

/// Clock text, zero line and past slots
pub const GREY: Rgb565 = Rgb565::new(64 >> 3, 64 >> 2, 64 >> 3);

/// Grid lines and start-up log text
pub const DARK_GREY: Rgb565 = Rgb565::new(32 >> 3, 32 >> 2, 32 >> 3);

/// Grid label text, slightly brighter than the lines it labels
pub const LABEL_GREY: Rgb565 = Rgb565::new(96 >> 3, 96 >> 2, 96 >> 3);

// ============================================================================
// Price band colours
// ============================================================================

/// At or below zero: being paid to use electricity
pub const BLUE: Rgb565 = Rgb565::new(0, 0, 220 >> 3);

pub const GREEN: Rgb565 = Rgb565::new(0, 128 >> 2, 0);

pub const YELLOW: Rgb565 = Rgb565::new(128 >> 3, 128 >> 2, 0);

pub const ORANGE: Rgb565 = Rgb565::new(128 >> 3, 80 >> 2, 0);

pub const RED: Rgb565 = Rgb565::new(128 >> 3, 0, 0);

/// Brighter red used for error text
pub const ERROR_RED: Rgb565 = Rgb565::new(220 >> 3, 40 >> 2, 40 >> 3);
