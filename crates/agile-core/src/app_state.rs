//! Application-wide run state and error types for agile-rs

use core::fmt::Write;

use thiserror_no_std::Error;

use crate::ntp::NtpError;
use crate::tariff::TariffError;

/// Coarse lifecycle of the device, advanced by the firmware main task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRunState {
    Uninitialized,
    WifiConnecting,
    WifiConnected,
    TimeSyncing,
    TimeKnown,
    FetchingPrices,
    Running,
    Error,
}

impl AppRunState {
    /// Whether the wall clock can be trusted in this state
    pub const fn time_known(self) -> bool {
        matches!(self, Self::TimeKnown | Self::FetchingPrices | Self::Running)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("WiFi connection failed: {0}")]
    Wifi(heapless::String<64>),
    #[error("Time sync failed: {0}")]
    TimeSync(NtpError),
    #[error("HTTP request failed: {0}")]
    Http(heapless::String<64>),
    #[error("Price data rejected: {0}")]
    Tariff(TariffError),
    #[error("Display error: {0}")]
    Display(heapless::String<64>),
}

impl From<NtpError> for AppError {
    fn from(e: NtpError) -> Self {
        Self::TimeSync(e)
    }
}

impl From<TariffError> for AppError {
    fn from(e: TariffError) -> Self {
        Self::Tariff(e)
    }
}

/// Format a `Debug` value into a bounded message, truncating on overflow.
///
/// Driver errors from the HAL crates are only `Debug`, and the error enums
/// above carry fixed-capacity strings so they stay allocation-free.
pub fn error_message<const N: usize>(value: &impl core::fmt::Debug) -> heapless::String<N> {
    let mut message = heapless::String::new();
    let mut out = Truncating {
        message: &mut message,
        full: false,
    };
    let _ = write!(out, "{:?}", value);
    message
}

/// Keeps whatever fits, one char at a time, and drops the rest.
struct Truncating<'a, const N: usize> {
    message: &'a mut heapless::String<N>,
    full: bool,
}

impl<const N: usize> Write for Truncating<'_, N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            if self.full || self.message.push(c).is_err() {
                self.full = true;
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_known_states() {
        assert!(!AppRunState::TimeSyncing.time_known());
        assert!(AppRunState::TimeKnown.time_known());
        assert!(AppRunState::Running.time_known());
        assert!(!AppRunState::Error.time_known());
    }

    #[test]
    fn test_error_message_formats_debug() {
        let message: heapless::String<16> = error_message(&NtpError::ShortPacket(12));
        assert_eq!(message.as_str(), "ShortPacket(12)");
    }

    #[test]
    fn test_error_message_overflow_is_bounded() {
        let message: heapless::String<4> = error_message(&NtpError::ShortPacket(12));
        assert_eq!(message.as_str(), "Shor");

        // The numeric fragment arrives in a separate write and is cut mid-way
        let message: heapless::String<13> = error_message(&NtpError::ShortPacket(12));
        assert_eq!(message.as_str(), "ShortPacket(1");
    }
}
