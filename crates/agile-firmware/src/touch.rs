//! FT6336U touch panel on the shared internal bus
//!
//! Polled every 20 ms; the interrupt line on the AW9523B is left unused.

use agile_core::app_state::error_message;
use agile_core::ui::TouchPoint;
use ft6336u_driver::{CtrlMode, FT6336U, GestureMode, TouchData, TouchStatus};
use log::info;
use thiserror_no_std::Error;

use crate::app_state::SharedI2c;

/// Expected CHIP_ID value
const CHIP_ID_FT6336U: u8 = 0x64;

#[derive(Error, Debug)]
pub enum TouchError {
    #[error("FT6336U: {0}")]
    Bus(heapless::String<64>),
    #[error("Unexpected touch chip ID 0x{0:02x}")]
    UnknownChip(u8),
}

impl TouchError {
    fn from_debug(e: &impl core::fmt::Debug) -> Self {
        Self::Bus(error_message(e))
    }
}

pub struct TouchPanel {
    driver: FT6336U<SharedI2c>,
}

impl TouchPanel {
    pub fn new(i2c: SharedI2c) -> Self {
        Self {
            driver: FT6336U::new(i2c),
        }
    }

    /// Check the chip ID and configure polling in active mode.
    pub async fn init(&mut self) -> Result<(), TouchError> {
        let chip_id = self
            .driver
            .read_chip_id()
            .await
            .map_err(|e| TouchError::from_debug(&e))?;
        if chip_id != CHIP_ID_FT6336U {
            return Err(TouchError::UnknownChip(chip_id));
        }

        self.driver
            .write_g_mode(GestureMode::Polling)
            .await
            .map_err(|e| TouchError::from_debug(&e))?;
        self.driver
            .write_ctrl_mode(CtrlMode::KeepActive)
            .await
            .map_err(|e| TouchError::from_debug(&e))?;

        info!("FT6336U ready");
        Ok(())
    }

    /// Scan the controller and reduce the result to a single contact.
    pub async fn primary_point(&mut self) -> Result<Option<TouchPoint>, TouchError> {
        let data = self
            .driver
            .scan()
            .await
            .map_err(|e| TouchError::from_debug(&e))?;
        Ok(primary_point(&data))
    }
}

/// Lowest-ID contact that is still down, if any
pub fn primary_point(data: &TouchData) -> Option<TouchPoint> {
    data.points
        .iter()
        .find(|p| p.status != TouchStatus::Release)
        .map(|p| TouchPoint::new(p.x, p.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agile_core::input::TouchTracker;
    use agile_core::ui::TouchEvent;

    fn data(count: u8, first: TouchStatus, second: TouchStatus) -> TouchData {
        let mut data = TouchData::default();
        data.touch_count = count;
        data.points[0].status = first;
        data.points[0].x = 40;
        data.points[0].y = 50;
        data.points[1].status = second;
        data.points[1].x = 280;
        data.points[1].y = 200;
        data
    }

    #[test]
    fn test_no_contact() {
        assert_eq!(primary_point(&TouchData::default()), None);
    }

    #[test]
    fn test_first_active_point_wins() {
        let touched = data(2, TouchStatus::Touch, TouchStatus::Stream);
        assert_eq!(primary_point(&touched), Some(TouchPoint::new(40, 50)));

        let second_only = data(2, TouchStatus::Release, TouchStatus::Stream);
        assert_eq!(primary_point(&second_only), Some(TouchPoint::new(280, 200)));
    }

    #[test]
    fn test_released_points_are_ignored() {
        // Coordinates linger after lift-off; only the status says it is gone
        let lifted = data(0, TouchStatus::Release, TouchStatus::Release);
        assert_eq!(primary_point(&lifted), None);
    }

    #[test]
    fn test_scans_feed_one_press_per_contact() {
        let mut tracker = TouchTracker::new();
        let scans = [
            data(1, TouchStatus::Touch, TouchStatus::Release),
            data(1, TouchStatus::Stream, TouchStatus::Release),
            data(0, TouchStatus::Release, TouchStatus::Release),
            data(1, TouchStatus::Touch, TouchStatus::Release),
        ];
        let presses = scans
            .iter()
            .filter_map(|scan| tracker.update(primary_point(scan)))
            .filter(|event| matches!(event, TouchEvent::Press(_)))
            .count();
        assert_eq!(presses, 2);
    }
}
