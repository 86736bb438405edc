//! Main-loop decision making
//!
//! The firmware and the simulator both poll at 20 ms. On each poll they hand
//! the current time and touch sample to [`Controller::tick`] and carry out
//! whatever [`ControlOutputs`] asks for: fetch prices, redraw, change the
//! backlight, beep, or recolour the status light. Fetch results are reported
//! back with [`Controller::prices_updated`] or [`Controller::fetch_failed`]
//! before the next tick.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use embassy_time::Instant;
use log::{debug, info};

use crate::backlight::{BacklightCommand, BacklightController, Tone};
use crate::config::{Config, PriceBands};
use crate::input::TouchTracker;
use crate::metrics::{PriceLevel, Rgb888Triple};
use crate::refresh::RefreshScheduler;
use crate::tariff::{PriceSet, SurroundingPrices};
use crate::ui::core::{TouchEvent, TouchPoint};

/// Everything the caller should do after one poll
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlOutputs {
    pub fetch: bool,
    pub redraw: bool,
    pub backlight: Option<BacklightCommand>,
    pub tone: Option<Tone>,
    pub status_light: Option<Rgb888Triple>,
}

pub struct Controller {
    timezone: Tz,
    bands: PriceBands,
    screen_width: u16,
    backlight: BacklightController,
    refresh: RefreshScheduler,
    touch: TouchTracker,
    prices: Option<PriceSet>,
}

impl Controller {
    pub fn new(config: &Config<'_>, screen_width: u16, uptime: Instant) -> Self {
        Self {
            timezone: config.timezone,
            bands: config.bands,
            screen_width,
            backlight: BacklightController::new(&config.backlight, &config.schedule, uptime),
            refresh: RefreshScheduler::new(&config.schedule),
            touch: TouchTracker::new(),
            prices: None,
        }
    }

    pub fn backlight(&self) -> &BacklightController {
        &self.backlight
    }

    pub fn prices(&self) -> Option<&PriceSet> {
        self.prices.as_ref()
    }

    pub fn tick(
        &mut self,
        now: DateTime<Utc>,
        uptime: Instant,
        touch: Option<TouchPoint>,
    ) -> ControlOutputs {
        let local = now.with_timezone(&self.timezone);
        let mut out = ControlOutputs {
            backlight: self.backlight.tick(local.hour(), uptime),
            ..ControlOutputs::default()
        };

        if let Some(TouchEvent::Press(point)) = self.touch.update(touch) {
            debug!("Touch at ({}, {})", point.x, point.y);
            let outcome = self.backlight.on_touch(point, self.screen_width, uptime);
            out.tone = Some(outcome.tone);
            out.backlight = Some(outcome.command);
        }

        out.fetch = self.refresh.should_fetch(now);

        if self.refresh.should_redraw(local.minute()) {
            out.redraw = true;
            out.status_light = Some(self.status_light_at(now));
        }

        out
    }

    /// Store freshly fetched prices and force a redraw on the next tick.
    pub fn prices_updated(&mut self, prices: PriceSet, now: DateTime<Utc>) {
        info!("Prices updated: {} slots", prices.len());
        self.refresh.record_success(now);
        self.refresh.invalidate();
        self.prices = Some(prices);
    }

    /// Keep any prices already held and retry after the back-off.
    pub fn fetch_failed(&mut self, now: DateTime<Utc>) {
        self.refresh.record_failure(now);
    }

    pub fn surrounding(&self, now: DateTime<Utc>) -> SurroundingPrices {
        self.prices
            .as_ref()
            .map(|p| p.surrounding(now))
            .unwrap_or_default()
    }

    fn status_light_at(&self, now: DateTime<Utc>) -> Rgb888Triple {
        let current = self.surrounding(now).current;
        PriceLevel::assess(current, &self.bands).status_light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backlight::BacklightLevel;
    use crate::config::{InternetConfig, TariffConfig};
    use crate::metrics::{STATUS_LIGHT_OFF, STATUS_LIGHT_PEAK};
    use crate::tariff::PriceSlot;
    use alloc::vec;
    use chrono::{TimeDelta, TimeZone};

    fn config() -> Config<'static> {
        Config::new(
            InternetConfig {
                ssid: "home",
                password: "secret",
            },
            TariffConfig::default(),
        )
    }

    fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, s).unwrap()
    }

    fn peak_at_noon() -> PriceSet {
        let slot = |h, m, price| PriceSlot {
            start: utc(h, m, 0),
            end: utc(h, m, 0) + TimeDelta::minutes(30),
            price,
        };
        PriceSet::from_slots(vec![slot(11, 30, 20.0), slot(12, 0, 35.0), slot(12, 30, 8.0)])
    }

    #[test]
    fn test_first_tick_fetches_and_redraws() {
        let mut c = Controller::new(&config(), 320, Instant::from_secs(0));
        let out = c.tick(utc(12, 0, 0), Instant::from_secs(0), None);
        assert!(out.fetch);
        assert!(out.redraw);
        assert_eq!(out.status_light, Some(STATUS_LIGHT_OFF));
        assert_eq!(out.tone, None);
    }

    #[test]
    fn test_prices_update_triggers_redraw_and_light() {
        let mut c = Controller::new(&config(), 320, Instant::from_secs(0));
        c.tick(utc(12, 5, 0), Instant::from_secs(0), None);
        c.prices_updated(peak_at_noon(), utc(12, 5, 1));

        let out = c.tick(utc(12, 5, 2), Instant::from_secs(2), None);
        assert!(!out.fetch);
        assert!(out.redraw);
        assert_eq!(out.status_light, Some(STATUS_LIGHT_PEAK));

        // Same minute: nothing to do
        let out = c.tick(utc(12, 5, 3), Instant::from_secs(3), None);
        assert!(!out.redraw);
        assert_eq!(out.status_light, None);

        // Next slot is cheap, light goes off on the redraw
        let out = c.tick(utc(12, 30, 0), Instant::from_secs(1500), None);
        assert!(out.redraw);
        assert_eq!(out.status_light, Some(STATUS_LIGHT_OFF));
    }

    #[test]
    fn test_touch_is_edge_triggered() {
        let mut c = Controller::new(&config(), 320, Instant::from_secs(0));
        let held = Some(TouchPoint::new(300, 120));

        let out = c.tick(utc(12, 0, 0), Instant::from_millis(0), held);
        assert_eq!(out.tone, Some(Tone::Up));
        assert_eq!(
            out.backlight,
            Some(BacklightCommand::Set(BacklightLevel::new(6, 10)))
        );

        let out = c.tick(utc(12, 0, 0), Instant::from_millis(20), held);
        assert_eq!(out.tone, None);
        assert_eq!(out.backlight, None);
        assert_eq!(c.backlight().level().get(), 6);
    }

    #[test]
    fn test_night_blanking_and_wake() {
        let mut c = Controller::new(&config(), 320, Instant::from_secs(0));
        let out = c.tick(utc(23, 30, 0), Instant::from_secs(31), None);
        assert_eq!(out.backlight, Some(BacklightCommand::Off));

        let out = c.tick(utc(23, 30, 1), Instant::from_secs(32), Some(TouchPoint::new(10, 10)));
        assert_eq!(out.tone, Some(Tone::Wake));
        assert_eq!(
            out.backlight,
            Some(BacklightCommand::Set(BacklightLevel::new(5, 10)))
        );
        assert!(c.backlight().is_screen_on());
    }

    #[test]
    fn test_failed_fetch_keeps_prices() {
        let mut c = Controller::new(&config(), 320, Instant::from_secs(0));
        c.prices_updated(peak_at_noon(), utc(11, 0, 0));
        c.fetch_failed(utc(12, 1, 0));
        assert!(c.prices().is_some());
        assert!(!c.tick(utc(12, 5, 0), Instant::from_secs(10), None).fetch);
        assert!(c.tick(utc(12, 6, 1), Instant::from_secs(20), None).fetch);
        assert_eq!(c.surrounding(utc(12, 10, 0)).current, 35.0);
    }
}
