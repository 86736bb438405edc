//! Output devices the controller drives
//!
//! The firmware implements these over the AXP2101 and a GPIO; the simulator
//! implements them with log lines and a dimmed window.

use core::fmt::Debug;

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use log::debug;

use crate::backlight::{BEEP_DURATION, Tone};
use crate::metrics::Rgb888Triple;

#[allow(async_fn_in_trait)]
pub trait Backlight {
    type Error: Debug;

    /// Drive the panel backlight, 0.0 is off and 1.0 is full
    async fn set_level(&mut self, brightness: f32) -> Result<(), Self::Error>;
}

#[allow(async_fn_in_trait)]
pub trait Buzzer {
    type Error: Debug;

    /// Sound `tone` for the standard beep length
    async fn beep(&mut self, tone: Tone) -> Result<(), Self::Error>;
}

#[allow(async_fn_in_trait)]
pub trait StatusLight {
    type Error: Debug;

    async fn set_rgb(&mut self, rgb: Rgb888Triple) -> Result<(), Self::Error>;
}

/// Piezo driven by toggling a GPIO at the tone frequency (50% duty)
pub struct SquareWaveBuzzer<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> SquareWaveBuzzer<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Play `frequency_hz` for `duration_us`, leaving the pin low.
    pub async fn play(&mut self, frequency_hz: u32, duration_us: u32) -> Result<(), P::Error> {
        if frequency_hz == 0 {
            return self.pin.set_low();
        }

        let half_period_us = 500_000 / frequency_hz;
        let cycles = duration_us / (2 * half_period_us.max(1));
        debug!("Beep {} Hz, {} cycles", frequency_hz, cycles);

        for _ in 0..cycles {
            self.pin.set_high()?;
            self.delay.delay_us(half_period_us).await;
            self.pin.set_low()?;
            self.delay.delay_us(half_period_us).await;
        }
        self.pin.set_low()
    }
}

impl<P, D> Buzzer for SquareWaveBuzzer<P, D>
where
    P: OutputPin,
    P::Error: Debug,
    D: DelayNs,
{
    type Error = P::Error;

    async fn beep(&mut self, tone: Tone) -> Result<(), Self::Error> {
        self.play(tone.frequency_hz(), BEEP_DURATION.as_micros() as u32)
            .await
    }
}
