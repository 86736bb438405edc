//! Backlight and status light on the AXP2101
//!
//! The panel backlight runs from DLDO1, so brightness is a rail voltage.
//! The CoreS3 has no RGB LED; the PMIC's charge LED stands in for the
//! status light and is lit for any non-black colour.

use agile_core::app_state::error_message;
use agile_core::metrics::Rgb888Triple;
use agile_core::peripherals::{Backlight, StatusLight};
use axp2101_embedded::{AsyncAxp2101, ChargeLedMode};
use log::debug;
use thiserror_no_std::Error;

use crate::app_state::SharedI2c;

/// DLDO1 voltage at the dimmest visible level
const BACKLIGHT_MIN_MILLIVOLTS: f32 = 2500.0;
/// DLDO1 voltage at full brightness
const BACKLIGHT_MAX_MILLIVOLTS: f32 = 3300.0;

#[derive(Error, Debug)]
#[error("AXP2101: {0}")]
pub struct PowerError(heapless::String<64>);

impl PowerError {
    fn from_debug(e: &impl core::fmt::Debug) -> Self {
        Self(error_message(e))
    }
}

/// Map 0.0..=1.0 to a DLDO1 voltage, `None` meaning the rail is off
pub fn backlight_millivolts(brightness: f32) -> Option<u16> {
    if brightness <= 0.0 {
        return None;
    }
    let brightness = brightness.min(1.0);
    let mv = BACKLIGHT_MIN_MILLIVOLTS
        + (BACKLIGHT_MAX_MILLIVOLTS - BACKLIGHT_MIN_MILLIVOLTS) * brightness;
    Some(mv as u16)
}

/// Owns the PMIC for the outputs the controller drives
pub struct Pmic {
    chip: AsyncAxp2101<SharedI2c>,
    led_on: bool,
}

impl Pmic {
    pub fn new(chip: AsyncAxp2101<SharedI2c>) -> Self {
        Self { chip, led_on: false }
    }
}

impl Backlight for Pmic {
    type Error = PowerError;

    async fn set_level(&mut self, brightness: f32) -> Result<(), Self::Error> {
        match backlight_millivolts(brightness) {
            None => {
                debug!("Backlight off");
                self.chip
                    .disable_dldo1()
                    .await
                    .map_err(|e| PowerError::from_debug(&e))
            }
            Some(mv) => {
                debug!("Backlight {} mV", mv);
                self.chip
                    .set_dldo1_voltage(mv)
                    .await
                    .map_err(|e| PowerError::from_debug(&e))?;
                self.chip
                    .enable_dldo1()
                    .await
                    .map_err(|e| PowerError::from_debug(&e))
            }
        }
    }
}

impl StatusLight for Pmic {
    type Error = PowerError;

    async fn set_rgb(&mut self, rgb: Rgb888Triple) -> Result<(), Self::Error> {
        let on = rgb != (0, 0, 0);
        if on == self.led_on {
            return Ok(());
        }
        let mode = if on { ChargeLedMode::On } else { ChargeLedMode::Off };
        self.chip
            .set_charging_led_mode(mode)
            .await
            .map_err(|e| PowerError::from_debug(&e))?;
        self.led_on = on;
        Ok(())
    }
}
