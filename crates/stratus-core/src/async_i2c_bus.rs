//! Async I2C bus sharing
//!
//! The scan, the character display and the sensor driver all sit on the same
//! I2C controller. Each of them receives its own [`AsyncI2cDevice`] handle to
//! one bus behind an Embassy mutex, so ownership stays with whoever holds a
//! handle while the transactions are still issued in strict program order
//! (scan, display init, sensor reads).

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::i2c::{ErrorType, I2c, Operation};

/// Mutex type the shared bus lives in.
pub type SharedBus<T> = Mutex<CriticalSectionRawMutex, T>;

/// One handle onto a shared async I2C bus.
///
/// The lock is held for the duration of a single transaction, never across
/// two, so handles can be freely interleaved by the caller.
///
/// # Example
///
/// ```ignore
/// static I2C_BUS: StaticCell<SharedBus<I2c<'static, Async>>> = StaticCell::new();
///
/// let bus = I2C_BUS.init(SharedBus::new(i2c));
/// let for_scan = AsyncI2cDevice::new(bus);
/// let for_display = AsyncI2cDevice::new(bus);
/// let for_sensor = AsyncI2cDevice::new(bus);
/// ```
pub struct AsyncI2cDevice<'a, T> {
    bus: &'a SharedBus<T>,
}

impl<'a, T> AsyncI2cDevice<'a, T> {
    #[inline]
    pub const fn new(bus: &'a SharedBus<T>) -> Self {
        Self { bus }
    }
}

impl<T> Clone for AsyncI2cDevice<'_, T> {
    fn clone(&self) -> Self {
        Self { bus: self.bus }
    }
}

impl<T> ErrorType for AsyncI2cDevice<'_, T>
where
    T: ErrorType,
{
    type Error = T::Error;
}

impl<T> I2c for AsyncI2cDevice<'_, T>
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
