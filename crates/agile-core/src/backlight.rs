//! Backlight level, touch control and night-time blanking
//!
//! Touching the right half of the screen brightens it one step, the left half
//! dims it one step. Between the configured night hours the screen blanks
//! after a period without touches, and any touch wakes it again. Outside the
//! night hours a blanked screen comes back on by itself.

use embassy_time::{Duration, Instant};
use log::info;

use crate::config::{BacklightConfig, ScheduleConfig};
use crate::ui::core::TouchPoint;

/// How long each feedback tone sounds
pub const BEEP_DURATION: Duration = Duration::from_millis(50);

/// Backlight brightness step, `0..=max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BacklightLevel(u8);

impl BacklightLevel {
    pub fn new(level: u8, max: u8) -> Self {
        Self(level.min(max))
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Level as a fraction of `max`
    pub fn fraction(self, max: u8) -> f32 {
        if max == 0 {
            0.0
        } else {
            self.0 as f32 / max as f32
        }
    }
}

/// Feedback tone for a touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Screen woken from sleep (C5)
    Wake,
    /// Brighter (E5)
    Up,
    /// Dimmer (A4)
    Down,
}

impl Tone {
    pub const fn frequency_hz(self) -> u32 {
        match self {
            Self::Wake => 523,
            Self::Up => 659,
            Self::Down => 440,
        }
    }
}

/// What the backlight driver should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklightCommand {
    /// Screen back on at this level
    On(BacklightLevel),
    /// Screen off
    Off,
    /// Apply a new level
    Set(BacklightLevel),
}

impl BacklightCommand {
    /// Brightness to drive, 0.0 when off
    pub fn brightness(self, max_level: u8) -> f32 {
        match self {
            Self::Off => 0.0,
            Self::On(level) | Self::Set(level) => level.fraction(max_level),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchOutcome {
    pub tone: Tone,
    pub command: BacklightCommand,
}

pub struct BacklightController {
    level: BacklightLevel,
    max_level: u8,
    screen_on: bool,
    last_touch: Instant,
    night_start_hour: u32,
    night_end_hour: u32,
    idle_timeout: Duration,
}

impl BacklightController {
    /// The screen starts on, with the idle timer running from `now`.
    pub fn new(backlight: &BacklightConfig, schedule: &ScheduleConfig, now: Instant) -> Self {
        Self {
            level: BacklightLevel::new(backlight.initial_level, backlight.max_level),
            max_level: backlight.max_level,
            screen_on: true,
            last_touch: now,
            night_start_hour: schedule.night_start_hour,
            night_end_hour: schedule.night_end_hour,
            idle_timeout: Duration::from_secs(schedule.idle_timeout_secs),
        }
    }

    pub fn level(&self) -> BacklightLevel {
        self.level
    }

    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    pub fn is_screen_on(&self) -> bool {
        self.screen_on
    }

    pub fn is_night(&self, local_hour: u32) -> bool {
        if self.night_start_hour <= self.night_end_hour {
            // Window that does not wrap midnight, e.g. 01..05
            local_hour >= self.night_start_hour && local_hour < self.night_end_hour
        } else {
            local_hour < self.night_end_hour || local_hour >= self.night_start_hour
        }
    }

    /// Apply the night schedule. Returns a command only on a state change.
    pub fn tick(&mut self, local_hour: u32, now: Instant) -> Option<BacklightCommand> {
        if self.is_night(local_hour) {
            let idle = now.saturating_duration_since(self.last_touch);
            if self.screen_on && idle > self.idle_timeout {
                info!(
                    "{} s since last touch, turning screen off",
                    idle.as_secs()
                );
                self.screen_on = false;
                return Some(BacklightCommand::Off);
            }
        } else if !self.screen_on {
            info!("Back to daytime, turning screen on");
            self.screen_on = true;
            return Some(BacklightCommand::On(self.level));
        }
        None
    }

    /// Handle a new touch contact. `screen_width` splits the dim and brighten halves.
    pub fn on_touch(&mut self, point: TouchPoint, screen_width: u16, now: Instant) -> TouchOutcome {
        self.last_touch = now;

        let tone = if !self.screen_on {
            info!("Touched whilst screen off, turning on");
            self.screen_on = true;
            self.level = BacklightLevel::new(self.level.get().max(1), self.max_level);
            Tone::Wake
        } else if point.x > screen_width / 2 {
            self.level = BacklightLevel::new(self.level.get().saturating_add(1), self.max_level);
            Tone::Up
        } else {
            self.level = BacklightLevel(self.level.get().saturating_sub(1));
            Tone::Down
        };

        info!("Backlight: {}/{}", self.level.get(), self.max_level);

        TouchOutcome {
            tone,
            command: BacklightCommand::Set(self.level),
        }
    }
}
