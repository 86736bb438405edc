//! Wire format of the Octopus Energy standard unit rates endpoint
//!
//! Only the fields the display needs are modelled; serde ignores the rest
//! (`payment_method` and friends).

use alloc::string::String;
use alloc::vec::Vec;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One page of `standard-unit-rates` results, newest slot first
#[derive(Debug, Deserialize)]
pub struct UnitRatesResponse {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<UnitRate>,
}

/// A single half-hourly rate, prices in pence per kWh
#[derive(Debug, Clone, Deserialize)]
pub struct UnitRate {
    pub value_exc_vat: f32,
    pub value_inc_vat: f32,
    pub valid_from: DateTime<Utc>,
    /// Open-ended rates (fixed tariffs) have no end
    pub valid_to: Option<DateTime<Utc>>,
}
