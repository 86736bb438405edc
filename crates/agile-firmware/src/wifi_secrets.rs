//! Credentials and tariff selection baked in by `build.rs` from `.env`

use agile_core::config::{Config, InternetConfig, TariffConfig};

pub const WIFI_SSID: &str = env!("WIFI_SSID");
pub const WIFI_PASSWORD: &str = env!("WIFI_PASSWORD");
pub const AGILE_PRODUCT_CODE: &str = env!("AGILE_PRODUCT_CODE");
pub const AGILE_REGION: &str = env!("AGILE_REGION");

/// Device configuration; everything not set in `.env` keeps its default.
pub fn device_config() -> Config<'static> {
    let tariff = TariffConfig {
        product_code: AGILE_PRODUCT_CODE,
        region: AGILE_REGION
            .chars()
            .next()
            .unwrap_or(TariffConfig::default().region),
    };
    Config::new(
        InternetConfig {
            ssid: WIFI_SSID,
            password: WIFI_PASSWORD,
        },
        tariff,
    )
}
