//! Hardware-independent core library for agile-rs
//!
//! This crate contains all platform-agnostic logic for the Agile price
//! display: tariff fetching model and JSON parsing, clock handling, chart
//! geometry, the backlight and refresh schedulers, touch handling, page
//! rendering and display management.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32-S3) and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod app_state;
pub mod backlight;
pub mod clock;
pub mod config;
pub mod controller;
pub mod display_manager;
pub mod framebuffer;
pub mod input;
pub mod metrics;
pub mod ntp;
pub mod pages;
pub mod peripherals;
pub mod refresh;
pub mod tariff;
pub mod ui;
