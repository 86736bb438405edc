//! Firmware-specific application state
//!
//! Re-exports the hardware-independent app state from `agile_core` and adds
//! the device's run-state tracking and hardware initialization.

mod hardware;

pub use hardware::*;

// Re-export all shared app state types from agile-core
pub use agile_core::app_state::*;

use agile_core::clock::WallClock;
use embassy_time::Instant;
use log::info;

/// Lifecycle and clock of the running device
pub struct AppState {
    pub run_state: AppRunState,
    pub clock: WallClock,
}

impl AppState {
    pub const fn new() -> Self {
        Self {
            run_state: AppRunState::Uninitialized,
            clock: WallClock::new(),
        }
    }

    pub fn advance(&mut self, next: AppRunState) {
        if next != self.run_state {
            info!("Run state {:?} -> {:?}", self.run_state, next);
            self.run_state = next;
        }
    }

    /// Record an SNTP result and mark the time as known.
    pub fn set_time(&mut self, unix_secs: u64) {
        self.clock.set(unix_secs, Instant::now());
        self.advance(AppRunState::TimeKnown);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
