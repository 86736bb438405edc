//! Wall-clock time derived from monotonic uptime
//!
//! The device has no battery-backed RTC, so UTC is only known after an SNTP
//! exchange. [`WallClock`] records the Unix time that corresponds to uptime
//! zero and converts any later `embassy_time::Instant` into a UTC timestamp.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use core::fmt::Write;
use embassy_time::Instant;
use log::info;

/// Maps uptime to UTC once a time source has been seen
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock {
    /// Unix time in microseconds at uptime zero
    boot_epoch_us: Option<i64>,
}

impl WallClock {
    pub const fn new() -> Self {
        Self {
            boot_epoch_us: None,
        }
    }

    /// Record that `unix_secs` was the time at `uptime`.
    pub fn set(&mut self, unix_secs: u64, uptime: Instant) {
        let boot_epoch_us = unix_secs as i64 * 1_000_000 - uptime.as_micros() as i64;
        if let Some(previous) = self.boot_epoch_us {
            info!(
                "Wall clock adjusted by {} ms",
                (boot_epoch_us - previous) / 1000
            );
        }
        self.boot_epoch_us = Some(boot_epoch_us);
    }

    pub fn is_set(&self) -> bool {
        self.boot_epoch_us.is_some()
    }

    /// UTC time at `uptime`, or `None` before the clock was set
    pub fn now(&self, uptime: Instant) -> Option<DateTime<Utc>> {
        let boot = self.boot_epoch_us?;
        DateTime::from_timestamp_micros(boot + uptime.as_micros() as i64)
    }
}

/// Convert a UTC instant to local time in `tz`
pub fn to_local(now: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    tz.from_utc_datetime(&now.naive_utc())
}

/// `HH:MM` in local time
pub fn format_clock(now: DateTime<Utc>, tz: Tz) -> heapless::String<8> {
    let local = to_local(now, tz);
    let mut text = heapless::String::new();
    let _ = write!(text, "{:02}:{:02}", local.hour(), local.minute());
    text
}
