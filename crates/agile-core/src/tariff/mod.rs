//! Half-hourly tariff prices
//!
//! Parses the unit-rate JSON into a [`PriceSet`] sorted oldest first and
//! answers the questions the display asks of it: the price now, either side
//! of now, and which slots belong on the chart.

pub mod model;

use alloc::string::String;
use alloc::vec::Vec;

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use thiserror_no_std::Error;

pub use model::{UnitRate, UnitRatesResponse};

/// Slots shown when only today's prices are known
pub const SLOTS_PER_DAY: usize = 48;

/// Slots shown once tomorrow's prices are published
pub const MAX_CHART_SLOTS: usize = 2 * SLOTS_PER_DAY;

/// Length of one Agile pricing slot
pub const SLOT_MINUTES: i64 = 30;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TariffError {
    #[error("Malformed unit rates JSON: {0}")]
    Json(String),
    #[error("No usable price slots in response")]
    NoData,
}

/// A half-hour (or any fixed-length) price window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Price including VAT, pence per kWh
    pub price: f32,
}

impl PriceSlot {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }

    /// Whether the slot is entirely in the past at `now`
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        now >= self.end
    }
}

/// Prices either side of now, 0.0 where no slot covers the instant
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurroundingPrices {
    pub previous: f32,
    pub current: f32,
    pub next: f32,
}

/// All known price slots, sorted by start time ascending
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSet {
    slots: Vec<PriceSlot>,
}

impl PriceSet {
    /// Build a set from arbitrary slots; they are sorted and deduplicated
    /// by start time.
    pub fn from_slots(mut slots: Vec<PriceSlot>) -> Self {
        slots.sort_by_key(|s| s.start);
        slots.dedup_by_key(|s| s.start);
        Self { slots }
    }

    pub fn slots(&self) -> &[PriceSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// End of the newest slot
    pub fn latest_end(&self) -> Option<DateTime<Utc>> {
        self.slots.last().map(|s| s.end)
    }

    pub fn price_at(&self, t: DateTime<Utc>) -> Option<f32> {
        // Sorted by start: the candidate is the last slot starting at or before t
        let idx = self.slots.partition_point(|s| s.start <= t);
        let slot = self.slots.get(idx.checked_sub(1)?)?;
        slot.contains(t).then_some(slot.price)
    }

    pub fn surrounding(&self, now: DateTime<Utc>) -> SurroundingPrices {
        let half_hour = TimeDelta::minutes(SLOT_MINUTES);
        SurroundingPrices {
            previous: self.price_at(now - half_hour).unwrap_or(0.0),
            current: self.price_at(now).unwrap_or(0.0),
            next: self.price_at(now + half_hour).unwrap_or(0.0),
        }
    }

    /// Slots to plot: the newest day, or the newest two days once the newest
    /// slot ends on a different local day than `now`.
    ///
    /// Agile days run 23:00 to 23:00 UK time, so before tomorrow's prices
    /// are published the newest slot still ends today.
    pub fn chart_window(&self, now: DateTime<Utc>, tz: Tz) -> &[PriceSlot] {
        let Some(newest) = self.slots.last() else {
            return &[];
        };

        let newest_day = newest.end.with_timezone(&tz).date_naive();
        let today = now.with_timezone(&tz).date_naive();
        let wanted = if newest_day != today {
            MAX_CHART_SLOTS
        } else {
            SLOTS_PER_DAY
        };

        let count = wanted.min(self.slots.len());
        &self.slots[self.slots.len() - count..]
    }
}

/// Parse a `standard-unit-rates` response body.
pub fn parse_unit_rates(body: &[u8]) -> Result<PriceSet, TariffError> {
    let response: UnitRatesResponse =
        serde_json::from_slice(body).map_err(|e| TariffError::Json(alloc::format!("{}", e)))?;

    debug!(
        "Unit rates: {} results on page (count {})",
        response.results.len(),
        response.count
    );

    let slots: Vec<PriceSlot> = response
        .results
        .into_iter()
        .filter_map(|rate| match rate.valid_to {
            Some(end) => Some(PriceSlot {
                start: rate.valid_from,
                end,
                price: rate.value_inc_vat,
            }),
            None => {
                warn!("Skipping open-ended rate from {}", rate.valid_from);
                None
            }
        })
        .collect();

    if slots.is_empty() {
        return Err(TariffError::NoData);
    }

    Ok(PriceSet::from_slots(slots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    /// Consecutive half-hour slots starting at `start`, prices from `price`
    fn slots_from(start: DateTime<Utc>, count: usize, price: impl Fn(usize) -> f32) -> Vec<PriceSlot> {
        (0..count)
            .map(|i| {
                let s = start + TimeDelta::minutes(SLOT_MINUTES * i as i64);
                PriceSlot {
                    start: s,
                    end: s + TimeDelta::minutes(SLOT_MINUTES),
                    price: price(i),
                }
            })
            .collect()
    }

    const SAMPLE: &str = r#"{
        "count": 3,
        "next": "https://api.octopus.energy/v1/products/AGILE-FLEX-22-11-25/electricity-tariffs/E-1R-AGILE-FLEX-22-11-25-B/standard-unit-rates/?page=2",
        "previous": null,
        "results": [
            {"value_exc_vat": 20.0, "value_inc_vat": 21.0, "valid_from": "2024-01-15T13:00:00Z", "valid_to": "2024-01-15T13:30:00Z", "payment_method": null},
            {"value_exc_vat": 15.0, "value_inc_vat": 15.75, "valid_from": "2024-01-15T12:30:00Z", "valid_to": "2024-01-15T13:00:00Z", "payment_method": null},
            {"value_exc_vat": -2.0, "value_inc_vat": -2.1, "valid_from": "2024-01-15T12:00:00Z", "valid_to": "2024-01-15T12:30:00Z", "payment_method": null}
        ]
    }"#;

    #[test]
    fn test_parse_sorts_oldest_first() {
        let set = parse_unit_rates(SAMPLE.as_bytes()).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.slots()[0].start, utc(2024, 1, 15, 12, 0));
        assert_eq!(set.slots()[0].price, -2.1);
        assert_eq!(set.latest_end(), Some(utc(2024, 1, 15, 13, 30)));
    }

    #[test]
    fn test_parse_skips_open_ended_rates() {
        let json = r#"{"results": [
            {"value_exc_vat": 20.0, "value_inc_vat": 21.0, "valid_from": "2024-01-15T13:00:00Z", "valid_to": null},
            {"value_exc_vat": 15.0, "value_inc_vat": 15.75, "valid_from": "2024-01-15T12:30:00Z", "valid_to": "2024-01-15T13:00:00Z"}
        ]}"#;
        let set = parse_unit_rates(json.as_bytes()).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_parse_empty_results_is_no_data() {
        let json = r#"{"count": 0, "next": null, "previous": null, "results": []}"#;
        assert_eq!(parse_unit_rates(json.as_bytes()), Err(TariffError::NoData));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_unit_rates(b"<html>502 Bad Gateway</html>"),
            Err(TariffError::Json(_))
        ));
    }

    #[test]
    fn test_price_at_uses_half_open_slots() {
        let set = parse_unit_rates(SAMPLE.as_bytes()).unwrap();
        assert_eq!(set.price_at(utc(2024, 1, 15, 12, 0)), Some(-2.1));
        assert_eq!(set.price_at(utc(2024, 1, 15, 12, 29)), Some(-2.1));
        assert_eq!(set.price_at(utc(2024, 1, 15, 12, 30)), Some(15.75));
        assert_eq!(set.price_at(utc(2024, 1, 15, 13, 30)), None);
        assert_eq!(set.price_at(utc(2024, 1, 15, 11, 59)), None);
    }

    #[test]
    fn test_surrounding_prices() {
        let set = parse_unit_rates(SAMPLE.as_bytes()).unwrap();
        let prices = set.surrounding(utc(2024, 1, 15, 12, 45));
        assert_eq!(
            prices,
            SurroundingPrices {
                previous: -2.1,
                current: 15.75,
                next: 21.0,
            }
        );
    }

    #[test]
    fn test_surrounding_prices_default_to_zero() {
        let set = parse_unit_rates(SAMPLE.as_bytes()).unwrap();
        let prices = set.surrounding(utc(2024, 1, 15, 13, 15));
        assert_eq!(prices.previous, 15.75);
        assert_eq!(prices.current, 21.0);
        assert_eq!(prices.next, 0.0);
    }

    #[test]
    fn test_chart_window_today_only() {
        // Winter: an Agile day runs 23:00Z to 23:00Z, newest slot starts 22:30Z today
        let set = PriceSet::from_slots(slots_from(utc(2024, 1, 14, 23, 0), 48, |i| i as f32));
        let window = set.chart_window(utc(2024, 1, 15, 14, 0), Tz::Europe__London);
        assert_eq!(window.len(), SLOTS_PER_DAY);
        assert_eq!(window[0].start, utc(2024, 1, 14, 23, 0));
    }

    #[test]
    fn test_chart_window_includes_tomorrow() {
        let set = PriceSet::from_slots(slots_from(utc(2024, 1, 14, 0, 0), 100, |i| i as f32));
        // Newest slot starts 2024-01-16 01:30Z, a later day than now
        let window = set.chart_window(utc(2024, 1, 15, 17, 0), Tz::Europe__London);
        assert_eq!(window.len(), MAX_CHART_SLOTS);
        assert_eq!(window.last().unwrap().price, 99.0);
    }

    #[test]
    fn test_chart_window_short_data() {
        let set = PriceSet::from_slots(slots_from(utc(2024, 1, 15, 10, 0), 5, |_| 1.0));
        let window = set.chart_window(utc(2024, 1, 15, 10, 0), Tz::Europe__London);
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn test_chart_window_uses_local_day() {
        // Newest slot ends 23:00Z on 1 June, which is already 2 June in BST
        let set = PriceSet::from_slots(slots_from(utc(2024, 5, 31, 22, 0), 50, |_| 1.0));
        let now = utc(2024, 6, 1, 12, 0);
        assert_eq!(set.chart_window(now, Tz::Europe__London).len(), 50);
        assert_eq!(set.chart_window(now, Tz::UTC).len(), SLOTS_PER_DAY);
    }

    #[test]
    fn test_chart_window_slot_ending_at_midnight_is_next_day() {
        // Newest slot is 23:30Z to 00:00Z, so it ends on 16 January
        let set = PriceSet::from_slots(slots_from(utc(2024, 1, 14, 18, 0), 60, |i| i as f32));
        assert_eq!(set.latest_end(), Some(utc(2024, 1, 16, 0, 0)));
        let window = set.chart_window(utc(2024, 1, 15, 12, 0), Tz::UTC);
        assert_eq!(window.len(), 60);
        assert_eq!(window[0].start, utc(2024, 1, 14, 18, 0));
    }

    #[test]
    fn test_from_slots_deduplicates() {
        let mut slots = slots_from(utc(2024, 1, 15, 10, 0), 3, |i| i as f32);
        slots.push(slots[1]);
        let set = PriceSet::from_slots(slots);
        assert_eq!(set.len(), 3);
    }
}
