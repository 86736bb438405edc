//! Colours and fonts shared by every page

pub mod colors;
pub mod fonts;

pub use colors::*;
pub use fonts::*;
