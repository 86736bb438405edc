//! Bakes WiFi credentials and tariff selection from `.env` into the binary.

const REQUIRED: &[&str] = &["WIFI_SSID", "WIFI_PASSWORD"];
const OPTIONAL: &[(&str, &str)] = &[
    ("AGILE_PRODUCT_CODE", "AGILE-FLEX-22-11-25"),
    ("AGILE_REGION", "B"),
];

fn main() {
    // A missing .env is fine when the variables come from the shell
    if let Ok(path) = dotenvy::dotenv() {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    for key in REQUIRED {
        println!("cargo:rerun-if-env-changed={key}");
        match std::env::var(key) {
            Ok(value) => println!("cargo:rustc-env={key}={value}"),
            Err(_) => panic!("{key} must be set in .env or the environment"),
        }
    }

    for (key, default) in OPTIONAL {
        println!("cargo:rerun-if-env-changed={key}");
        let value = std::env::var(key).unwrap_or_else(|_| default.to_string());
        println!("cargo:rustc-env={key}={value}");
    }

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
