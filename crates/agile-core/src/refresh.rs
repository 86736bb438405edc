//! When to fetch prices and when to redraw

use chrono::{DateTime, TimeDelta, Utc};
use log::debug;

use crate::config::ScheduleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastFetch {
    Never,
    Succeeded(DateTime<Utc>),
    Failed(DateTime<Utc>),
}

/// Tracks fetch outcomes and the last drawn minute
pub struct RefreshScheduler {
    refresh_interval: TimeDelta,
    retry_interval: TimeDelta,
    last_fetch: LastFetch,
    last_success: Option<DateTime<Utc>>,
    last_drawn_minute: Option<u32>,
}

impl RefreshScheduler {
    pub fn new(schedule: &ScheduleConfig) -> Self {
        Self {
            refresh_interval: TimeDelta::seconds(schedule.price_refresh_secs as i64),
            retry_interval: TimeDelta::seconds(schedule.fetch_retry_secs as i64),
            last_fetch: LastFetch::Never,
            last_success: None,
            last_drawn_minute: None,
        }
    }

    /// Whether a price fetch is due at `now`
    pub fn should_fetch(&self, now: DateTime<Utc>) -> bool {
        match self.last_fetch {
            LastFetch::Never => true,
            LastFetch::Succeeded(at) => now - at > self.refresh_interval,
            LastFetch::Failed(at) => now - at > self.retry_interval,
        }
    }

    pub fn record_success(&mut self, now: DateTime<Utc>) {
        self.last_fetch = LastFetch::Succeeded(now);
        self.last_success = Some(now);
    }

    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        debug!("Fetch failed, retrying in {} s", self.retry_interval.num_seconds());
        self.last_fetch = LastFetch::Failed(now);
    }

    /// Time of the last successful fetch
    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        self.last_success
    }

    /// True the first time it sees each new local minute.
    pub fn should_redraw(&mut self, local_minute: u32) -> bool {
        if self.last_drawn_minute == Some(local_minute) {
            return false;
        }
        self.last_drawn_minute = Some(local_minute);
        true
    }

    /// Forget the drawn minute so the next check redraws.
    pub fn invalidate(&mut self) {
        self.last_drawn_minute = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_705_320_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_first_fetch_is_immediate() {
        let s = RefreshScheduler::new(&ScheduleConfig::default());
        assert!(s.should_fetch(at(0)));
    }

    #[test]
    fn test_refetch_after_interval() {
        let mut s = RefreshScheduler::new(&ScheduleConfig::default());
        s.record_success(at(0));
        assert!(!s.should_fetch(at(3600)));
        assert!(s.should_fetch(at(3601)));
        assert_eq!(s.last_success(), Some(at(0)));
    }

    #[test]
    fn test_failure_retries_sooner() {
        let mut s = RefreshScheduler::new(&ScheduleConfig::default());
        s.record_success(at(0));
        s.record_failure(at(3601));
        assert!(!s.should_fetch(at(3800)));
        assert!(s.should_fetch(at(3902)));
        // The last good fetch is still known
        assert_eq!(s.last_success(), Some(at(0)));
    }

    #[test]
    fn test_redraw_once_per_minute() {
        let mut s = RefreshScheduler::new(&ScheduleConfig::default());
        assert!(s.should_redraw(14));
        assert!(!s.should_redraw(14));
        assert!(s.should_redraw(15));
        s.invalidate();
        assert!(s.should_redraw(15));
    }
}
