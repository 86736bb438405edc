//! Price level assessment
//!
//! Buckets a unit price into one of five bands and maps each band to the
//! colour used for chart dots, price text and the status light.

use embedded_graphics::pixelcolor::Rgb565;

use crate::config::PriceBands;
use crate::ui::styling::{BLUE, GREEN, GREY, ORANGE, RED, YELLOW};

/// RGB triple for the status light, 8 bits per channel
pub type Rgb888Triple = (u8, u8, u8);

/// Status light colour while the current price is at its peak (half-brightness red)
pub const STATUS_LIGHT_PEAK: Rgb888Triple = (127, 0, 0);

/// Status light colour at any other time
pub const STATUS_LIGHT_OFF: Rgb888Triple = (0, 0, 0);

/// Price band for a unit rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceLevel {
    /// Free or negative pricing
    Plunge,
    Cheap,
    Moderate,
    Pricey,
    Peak,
}

impl PriceLevel {
    /// Assess a price in pence per kWh; band bounds are inclusive
    pub fn assess(price: f32, bands: &PriceBands) -> Self {
        if price <= bands.plunge_max {
            Self::Plunge
        } else if price <= bands.cheap_max {
            Self::Cheap
        } else if price <= bands.moderate_max {
            Self::Moderate
        } else if price <= bands.pricey_max {
            Self::Pricey
        } else {
            Self::Peak
        }
    }

    pub const fn color(self) -> Rgb565 {
        match self {
            Self::Plunge => BLUE,
            Self::Cheap => GREEN,
            Self::Moderate => YELLOW,
            Self::Pricey => ORANGE,
            Self::Peak => RED,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Plunge => "Plunge",
            Self::Cheap => "Cheap",
            Self::Moderate => "Moderate",
            Self::Pricey => "Pricey",
            Self::Peak => "Peak",
        }
    }

    pub const fn status_light(self) -> Rgb888Triple {
        match self {
            Self::Peak => STATUS_LIGHT_PEAK,
            _ => STATUS_LIGHT_OFF,
        }
    }
}

/// Colour of a chart dot: its band colour, or grey once the slot has passed
pub fn slot_color(price: f32, past: bool, bands: &PriceBands) -> Rgb565 {
    if past {
        GREY
    } else {
        PriceLevel::assess(price, bands).color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries_are_inclusive() {
        let bands = PriceBands::default();
        assert_eq!(PriceLevel::assess(-5.0, &bands), PriceLevel::Plunge);
        assert_eq!(PriceLevel::assess(0.0, &bands), PriceLevel::Plunge);
        assert_eq!(PriceLevel::assess(0.01, &bands), PriceLevel::Cheap);
        assert_eq!(PriceLevel::assess(10.0, &bands), PriceLevel::Cheap);
        assert_eq!(PriceLevel::assess(23.0, &bands), PriceLevel::Moderate);
        assert_eq!(PriceLevel::assess(30.0, &bands), PriceLevel::Pricey);
        assert_eq!(PriceLevel::assess(30.5, &bands), PriceLevel::Peak);
    }

    #[test]
    fn test_custom_bands() {
        let bands = PriceBands {
            plunge_max: 2.0,
            cheap_max: 5.0,
            moderate_max: 15.0,
            pricey_max: 20.0,
        };
        assert_eq!(PriceLevel::assess(1.5, &bands), PriceLevel::Plunge);
        assert_eq!(PriceLevel::assess(25.0, &bands), PriceLevel::Peak);
    }

    #[test]
    fn test_status_light_only_for_peak() {
        assert_eq!(PriceLevel::Peak.status_light(), (127, 0, 0));
        assert_eq!(PriceLevel::Pricey.status_light(), (0, 0, 0));
        assert_eq!(PriceLevel::Plunge.status_light(), (0, 0, 0));
    }

    #[test]
    fn test_past_slots_are_grey() {
        let bands = PriceBands::default();
        assert_eq!(slot_color(40.0, true, &bands), GREY);
        assert_eq!(slot_color(40.0, false, &bands), RED);
    }
}
