//! I2C controller bring-up
//!
//! The node has two hardware I2C controllers routed to the same pins. The
//! first one is tried first; if it cannot be configured the second one takes
//! over so the cycle still gets a bus.

use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::i2c::master::{Config as I2cConfig, ConfigError, I2c};
use esp_hal::peripherals::{I2C0, I2C1};
use esp_hal::time::Rate;
use log::{info, warn};
use static_cell::StaticCell;
use stratus_core::async_i2c_bus::{AsyncI2cDevice, SharedBus};
use stratus_core::config::BusConfig;

/// SDA GPIO the board routes to the sensor and display header
pub const BOARD_SDA: u8 = 21;
/// SCL GPIO the board routes to the sensor and display header
pub const BOARD_SCL: u8 = 22;

pub type BusDriver = I2c<'static, esp_hal::Async>;

/// One handle onto the node's shared I2C bus
pub type BusHandle = AsyncI2cDevice<'static, BusDriver>;

/// Configure controller 0 on `sda`/`scl`, falling back to controller 1.
///
/// `sda`/`scl` must be the [`BOARD_SDA`] and [`BOARD_SCL`] GPIOs; a config naming
/// other pins is reported and otherwise ignored.
pub fn create_i2c_bus(
    i2c0: I2C0<'static>,
    i2c1: I2C1<'static>,
    sda: impl PeripheralOutput<'static>,
    scl: impl PeripheralOutput<'static>,
    config: &BusConfig,
) -> Result<BusDriver, ConfigError> {
    if !config.wired_to(BOARD_SDA, BOARD_SCL) {
        warn!(
            "Bus config names SDA={} SCL={}, board is wired to SDA={} SCL={}",
            config.sda_pin, config.scl_pin, BOARD_SDA, BOARD_SCL
        );
    }
    let bus_config = I2cConfig::default().with_frequency(Rate::from_hz(config.frequency_hz));

    let i2c = match I2c::new(i2c0, bus_config) {
        Ok(i2c) => {
            info!("I2C0 on SDA={} SCL={}", BOARD_SDA, BOARD_SCL);
            i2c
        }
        Err(e) => {
            warn!("I2C0 unavailable ({:?}), falling back to I2C1", e);
            I2c::new(i2c1, bus_config)?
        }
    };

    Ok(i2c.with_sda(sda).with_scl(scl).into_async())
}

/// Put the bus behind a mutex and return the handle for the scan.
///
/// Further handles for the display and the sensor are clones of it.
pub fn share_bus(i2c: BusDriver) -> BusHandle {
    static I2C_BUS: StaticCell<SharedBus<BusDriver>> = StaticCell::new();
    AsyncI2cDevice::new(I2C_BUS.init(SharedBus::new(i2c)))
}
