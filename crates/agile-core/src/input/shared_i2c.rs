//! Async I2C bus sharing
//!
//! The CoreS3 internal bus carries the AXP2101 power manager, the AW9523B
//! expander and the touch controller. Each driver gets its own
//! [`SharedI2cDevice`] and the async mutex serialises their transactions,
//! yielding to the executor while one is in flight.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::i2c::{ErrorType, I2c, Operation};

/// Handle to a bus shared through an embassy [`Mutex`]
///
/// ```ignore
/// static I2C_BUS: StaticCell<Mutex<CriticalSectionRawMutex, I2c<'static, Async>>> = StaticCell::new();
/// let bus = I2C_BUS.init(Mutex::new(i2c));
/// let touch = FT6336U::new(SharedI2cDevice::new(bus));
/// let pmic = SharedI2cDevice::new(bus);
/// ```
pub struct SharedI2cDevice<'a, T> {
    bus: &'a Mutex<CriticalSectionRawMutex, T>,
}

impl<'a, T> SharedI2cDevice<'a, T> {
    #[inline]
    pub const fn new(bus: &'a Mutex<CriticalSectionRawMutex, T>) -> Self {
        Self { bus }
    }
}

impl<T> ErrorType for SharedI2cDevice<'_, T>
where
    T: ErrorType,
{
    type Error = T::Error;
}

impl<T> I2c for SharedI2cDevice<'_, T>
where
    T: I2c,
{
    #[inline]
    async fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        let mut bus = self.bus.lock().await;
        bus.read(address, read).await
    }

    #[inline]
    async fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        let mut bus = self.bus.lock().await;
        bus.write(address, write).await
    }

    /// Holds the lock across both halves so no other device can move the
    /// register pointer in between.
    #[inline]
    async fn write_read(
        &mut self,
        address: u8,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        let mut bus = self.bus.lock().await;
        bus.write_read(address, write, read).await
    }

    #[inline]
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut bus = self.bus.lock().await;
        bus.transaction(address, operations).await
    }
}
