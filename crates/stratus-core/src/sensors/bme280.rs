use crate::bus::BusAddress;
use crate::sensors::{FloatSensorDriver, FloatValues, SensorError};

use ::bme280::i2c::AsyncBME280;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use log::{error, info};

/// Float-shaped BME280 driver.
///
/// The `bme280` crate reports compensated floats with pressure in pascal,
/// which is exactly the [`FloatSensorDriver`] convention.
pub struct Bme280Driver<I, D> {
    sensor: AsyncBME280<I>,
    delay: D,
    initialized: bool,
}

impl<I: I2c, D: DelayNs> Bme280Driver<I, D> {
    pub fn new(i2c: I, address: BusAddress, delay: D) -> Self {
        Self {
            sensor: AsyncBME280::new(i2c, address.get()),
            delay,
            initialized: false,
        }
    }

    /// Verify the chip id and load the calibration data.
    ///
    /// Called by the driver registry while binding so a wrong device at the
    /// resolved address is caught before sampling starts.
    pub async fn initialize(&mut self) -> Result<(), SensorError> {
        self.sensor.init(&mut self.delay).await.map_err(|e| {
            error!("BME280 init failed: {:?}", e);
            SensorError::InitializationFailed {
                sensor: "BME280",
                details: "chip id or calibration read failed",
            }
        })?;

        info!("BME280: calibration loaded");
        self.initialized = true;
        Ok(())
    }
}

impl<I: I2c, D: DelayNs> FloatSensorDriver for Bme280Driver<I, D> {
    type Error = SensorError;

    async fn measure(&mut self) -> Result<FloatValues, SensorError> {
        if !self.initialized {
            self.initialize().await?;
        }

        let measurement = self.sensor.measure(&mut self.delay).await.map_err(|e| {
            error!("BME280 forced measurement failed: {:?}", e);
            SensorError::ReadFailed {
                sensor: "BME280",
                operation: "forced measurement",
                details: "I2C communication error or sensor not responding",
            }
        })?;

        Ok(FloatValues {
            temperature: measurement.temperature,
            humidity: measurement.humidity,
            pressure: measurement.pressure,
        })
    }
}
