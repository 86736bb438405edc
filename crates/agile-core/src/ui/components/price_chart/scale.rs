//! Vertical price scale
//!
//! The scale spans whole 10p rows: down to the lower of the cheapest price
//! and -10p, up to the dearest price, always at least one row tall.

use core::fmt::Write;

use heapless::String;

use super::constants::{GRID_STEP_PENCE, MAX_GRID_LABEL_LEN, SCALE_FLOOR_PENCE};

/// Maps prices in pence to screen rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    /// Lowest grid row, in units of 10p
    pub bottom: i32,
    /// Highest grid row, in units of 10p
    pub top: i32,
    pub px_per_penny: f32,
    /// Screen y of the 0p line
    pub zero_line: f32,
}

/// One horizontal grid line
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub pence: i32,
    pub y: i32,
    pub label: String<MAX_GRID_LABEL_LEN>,
}

impl GridRow {
    pub fn is_zero(&self) -> bool {
        self.pence == 0
    }
}

impl PriceScale {
    /// Fit a scale to `prices` within a plot `plot_height` pixels tall whose
    /// top edge is at `plot_top`. Returns `None` for no prices.
    pub fn from_prices<I>(prices: I, plot_top: i32, plot_height: u32) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut iter = prices.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));

        let step = GRID_STEP_PENCE as f32;
        let bottom = floor_i32(min.min(SCALE_FLOOR_PENCE) / step);
        let top = ceil_i32(max / step).max(bottom + 1);

        let px_per_penny = plot_height as f32 / (step * (top - bottom) as f32);
        let zero_line = plot_top as f32 + (top * GRID_STEP_PENCE) as f32 * px_per_penny;

        Some(Self {
            bottom,
            top,
            px_per_penny,
            zero_line,
        })
    }

    pub fn y_for(&self, price: f32) -> i32 {
        round_i32(self.zero_line - price * self.px_per_penny)
    }

    /// Grid rows from the bottom of the scale to the top
    pub fn grid_rows(&self) -> impl Iterator<Item = GridRow> + '_ {
        (self.bottom..=self.top).map(|i| {
            let pence = i * GRID_STEP_PENCE;
            let mut label = String::new();
            let _ = write!(label, "{}p", pence);
            GridRow {
                pence,
                y: self.y_for(pence as f32),
                label,
            }
        })
    }
}

fn floor_i32(v: f32) -> i32 {
    let t = v as i32;
    if (t as f32) > v { t - 1 } else { t }
}

fn ceil_i32(v: f32) -> i32 {
    let t = v as i32;
    if (t as f32) < v { t + 1 } else { t }
}

fn round_i32(v: f32) -> i32 {
    if v >= 0.0 {
        (v + 0.5) as i32
    } else {
        (v - 0.5) as i32
    }
}
