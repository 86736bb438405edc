//! Edge detection for a polled touch panel
//!
//! The panel reports contact on every poll while a finger is down. One
//! contact should produce one backlight step, so only the transition from
//! no contact to contact is reported.

use crate::ui::core::{TouchEvent, TouchPoint};

#[derive(Debug, Default)]
pub struct TouchTracker {
    in_contact: bool,
}

impl TouchTracker {
    pub const fn new() -> Self {
        Self { in_contact: false }
    }

    /// Feed one poll result; returns a press on a new contact only.
    pub fn update(&mut self, sample: Option<TouchPoint>) -> Option<TouchEvent> {
        let was_in_contact = self.in_contact;
        self.in_contact = sample.is_some();
        match sample {
            Some(point) if !was_in_contact => Some(TouchEvent::Press(point)),
            _ => None,
        }
    }

    pub fn in_contact(&self) -> bool {
        self.in_contact
    }
}
