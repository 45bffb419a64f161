//! Hardware-independent core library for stratus
//!
//! This crate contains all platform-agnostic logic of the stratus battery
//! telemetry node: I2C bus discovery and address resolution, the sensor
//! adapter over both driver shapes, the sampling engine, the character
//! display presenter, telemetry payload encoding and the wake-cycle
//! controller that decides when to retreat into deep sleep.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets (ESP32) and desktop hosts (for the simulator and tests).
//! Every piece of hardware is reached through a trait; the firmware and the
//! simulator provide the concrete bindings.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod app_state;
pub mod async_i2c_bus;
pub mod bus;
pub mod config;
pub mod display;
pub mod network;
pub mod normalize;
pub mod power;
pub mod sampling;
pub mod sensors;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use app_state::{CycleController, CycleOutcome, CycleState, Peripherals, wake};
pub use config::NodeConfig;
pub use sensors::CanonicalReading;
