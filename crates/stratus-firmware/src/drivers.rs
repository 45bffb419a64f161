//! Sensor drivers compiled into this firmware
//!
//! The board carries the float-shaped BME280 driver when the
//! `sensor-bme280` feature is enabled. Without it the registry reports no
//! compatible driver and every cycle retreats with `NoSensorDriver`.

use log::info;
use stratus_core::bus::BusAddress;
use stratus_core::sensors::{DriverKind, DriverRegistry, SensorDriver, SensorError, Unsupported};

#[cfg(feature = "sensor-bme280")]
use embassy_time::Delay;
#[cfg(feature = "sensor-bme280")]
use stratus_core::sensors::bme280::Bme280Driver;

use crate::hardware::BusHandle;

#[cfg(feature = "sensor-bme280")]
type FloatDriver = Bme280Driver<BusHandle, Delay>;
#[cfg(not(feature = "sensor-bme280"))]
type FloatDriver = Unsupported;

/// Binds sensor drivers onto the shared bus
pub struct BoardDrivers {
    #[cfg_attr(not(feature = "sensor-bme280"), allow(dead_code))]
    i2c: BusHandle,
}

impl BoardDrivers {
    pub const fn new(i2c: BusHandle) -> Self {
        Self { i2c }
    }
}

impl DriverRegistry for BoardDrivers {
    type Text = Unsupported;
    type Float = FloatDriver;

    fn available(&self) -> Option<DriverKind> {
        cfg!(feature = "sensor-bme280").then_some(DriverKind::Float)
    }

    async fn bind(
        &mut self,
        kind: DriverKind,
        address: BusAddress,
    ) -> Result<SensorDriver<Unsupported, FloatDriver>, SensorError> {
        #[cfg(feature = "sensor-bme280")]
        {
            if kind == DriverKind::Float {
                let mut driver = Bme280Driver::new(self.i2c.clone(), address, Delay);
                driver.initialize().await?;
                info!("BME280 bound at {}", address);
                return Ok(SensorDriver::Float(driver));
            }
        }

        info!("No {:?} driver for {} in this build", kind, address);
        Err(SensorError::InitializationFailed {
            sensor: "BME280",
            details: "driver not built in",
        })
    }
}
