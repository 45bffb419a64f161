//! ESP32 firmware-specific modules for stratus
//!
//! This crate contains the hardware bindings that cannot compile on desktop
//! targets: I2C controller bring-up, the BME280 driver registry, the
//! esp-radio station link, the HTTPS uploader and RTC deep sleep. The wake
//! cycle itself lives in `stratus_core`.

#![no_std]

extern crate alloc;

pub mod drivers;
pub mod hardware;
pub mod http;
pub mod sleep;
pub mod wifi;
pub mod wifi_secrets;
