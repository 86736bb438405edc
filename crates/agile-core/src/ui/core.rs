//! Core UI traits and types

use alloc::boxed::Box;
use chrono::{DateTime, Utc};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::tariff::PriceSet;

/// Represents a 2D touch point on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn to_point(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

/// Touch events that can occur on the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    /// A new contact at a point
    Press(TouchPoint),
}

/// Page identifier for navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageId {
    Startup,
    Prices,
    Error,
}

/// Boot milestones shown on the startup page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupStep {
    WifiConnected,
    TimeSynced,
    TimeSyncFailed,
    PricesFetched,
}

/// Events that pages can subscribe to for updates
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// A new set of unit rates arrived
    PricesUpdated(Box<PriceSet>),
    /// Wall-clock minute changed
    Tick(DateTime<Utc>),
    /// Progress during boot
    Startup(StartupStep),
}

/// Trait for any UI element that can be drawn
pub trait Drawable {
    /// Draw the element to the display within the given bounds
    fn draw<D: DrawTarget<Color = embedded_graphics::pixelcolor::Rgb565>>(
        &self,
        display: &mut D,
    ) -> Result<(), D::Error>;

    /// Get the bounds of this drawable element
    fn bounds(&self) -> Rectangle;

    /// Check if this element needs to be redrawn
    fn is_dirty(&self) -> bool;

    /// Mark this element as clean (already drawn)
    fn mark_clean(&mut self);

    /// Mark this element as dirty (needs redraw)
    fn mark_dirty(&mut self);
}
