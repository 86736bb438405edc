//! Device configuration
//!
//! The firmware fills a [`Config`] from compile-time environment values and
//! the simulator loads one from JSON. Everything except the WiFi credentials
//! and the tariff selection has a sensible default.

use alloc::format;
use alloc::string::String;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Octopus Agile product the prices are read from
pub const DEFAULT_PRODUCT_CODE: &str = "AGILE-FLEX-22-11-25";

/// Grid supply point group letter (B = East Midlands)
pub const DEFAULT_REGION: char = 'B';

const API_BASE_URL: &str = "https://api.octopus.energy/v1/products";

/// Valid GSP group letters. `I` and `O` are not used.
const REGIONS: &str = "ABCDEFGHJKLMNP";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown tariff region '{0}'")]
    InvalidRegion(char),
    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct Config<'a> {
    pub internet: InternetConfig<'a>,
    pub tariff: TariffConfig<'a>,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub backlight: BacklightConfig,
    #[serde(default)]
    pub bands: PriceBands,
    #[serde(default = "default_ntp_server")]
    pub ntp_server: &'a str,
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
}

impl<'a> Config<'a> {
    pub fn new(internet: InternetConfig<'a>, tariff: TariffConfig<'a>) -> Self {
        Self {
            internet,
            tariff,
            schedule: ScheduleConfig::default(),
            backlight: BacklightConfig::default(),
            bands: PriceBands::default(),
            ntp_server: default_ntp_server(),
            timezone: default_timezone(),
        }
    }

    /// Parse a configuration from JSON, validating the tariff region.
    pub fn from_json(json: &'a str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::Malformed(format!("{}", e)))?;
        config.tariff.validate()?;
        Ok(config)
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
pub struct InternetConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct TariffConfig<'a> {
    pub product_code: &'a str,
    pub region: char,
}

impl Default for TariffConfig<'_> {
    fn default() -> Self {
        Self {
            product_code: DEFAULT_PRODUCT_CODE,
            region: DEFAULT_REGION,
        }
    }
}

impl TariffConfig<'_> {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if REGIONS.contains(self.region.to_ascii_uppercase()) {
            Ok(())
        } else {
            Err(ConfigError::InvalidRegion(self.region))
        }
    }

    /// Tariff code for a single-register electricity meter in this region
    pub fn tariff_code(&self) -> String {
        format!(
            "E-1R-{}-{}",
            self.product_code,
            self.region.to_ascii_uppercase()
        )
    }

    /// Standard unit rates endpoint for this tariff
    pub fn endpoint(&self) -> Result<String, ConfigError> {
        self.validate()?;
        Ok(format!(
            "{}/{}/electricity-tariffs/{}/standard-unit-rates/",
            API_BASE_URL,
            self.product_code,
            self.tariff_code()
        ))
    }
}

/// Timing of price refreshes and night-time screen blanking
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Local hour at which night mode starts (inclusive)
    pub night_start_hour: u32,
    /// Local hour at which night mode ends (exclusive)
    pub night_end_hour: u32,
    /// Seconds without a touch before the screen is blanked at night
    pub idle_timeout_secs: u64,
    /// Seconds between successful price fetches
    pub price_refresh_secs: u64,
    /// Seconds before retrying after a failed fetch
    pub fetch_retry_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            night_start_hour: 23,
            night_end_hour: 6,
            idle_timeout_secs: 30,
            price_refresh_secs: 3600,
            fetch_retry_secs: 300,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct BacklightConfig {
    pub initial_level: u8,
    pub max_level: u8,
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self {
            initial_level: 5,
            max_level: 10,
        }
    }
}

/// Inclusive upper bounds, in pence per kWh, of each price band.
///
/// Anything above `pricey_max` is peak.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PriceBands {
    pub plunge_max: f32,
    pub cheap_max: f32,
    pub moderate_max: f32,
    pub pricey_max: f32,
}

impl Default for PriceBands {
    fn default() -> Self {
        Self {
            plunge_max: 0.0,
            cheap_max: 10.0,
            moderate_max: 23.0,
            pricey_max: 30.0,
        }
    }
}

fn default_ntp_server<'a>() -> &'a str {
    "pool.ntp.org"
}

fn default_timezone() -> Tz {
    Tz::Europe__London
}
