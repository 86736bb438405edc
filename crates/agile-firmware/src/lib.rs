//! ESP32-S3 firmware-specific modules for agile-rs
//!
//! This crate contains hardware-specific code that cannot compile on desktop
//! targets: ESP32 peripheral initialization, the WiFi link, SNTP and HTTPS
//! over embassy-net, the FT6336U touch panel, and the AXP2101-backed backlight
//! and status light.

#![no_std]

extern crate alloc;

pub mod app_state;
pub mod http;
pub mod power;
pub mod sntp;
pub mod touch;
pub mod wifi;
pub mod wifi_secrets;
