//! Synthetic BME280 drivers in both conventions
//!
//! Values follow a slow deterministic drift keyed on the cycle number with a
//! small per-sample ripple, so averaging and rounding can be watched in the
//! log.

use core::fmt::Write;

use log::info;
use stratus_core::bus::{BusAddress, DeviceRole};
use stratus_core::sensors::{
    DriverKind, DriverRegistry, FloatSensorDriver, FloatValues, SensorDriver, SensorError,
    TextSensorDriver, TextValue, TextValues,
};

#[derive(Debug, Clone, Copy)]
struct Climate {
    cycle: u32,
    sample: u32,
}

impl Climate {
    const fn new(cycle: u32) -> Self {
        Self { cycle, sample: 0 }
    }

    /// Temperature in °C, humidity in %, pressure in hPa.
    fn next(&mut self) -> (f32, f32, f32) {
        let t = self.cycle as f32;
        let ripple = (self.sample % 3) as f32 * 0.05;
        self.sample += 1;

        (
            21.0 + 2.5 * (t / 5.0).sin() + ripple,
            45.0 + 8.0 * (t / 7.0).cos() - ripple,
            1008.0 + 4.0 * (t / 11.0).sin() + ripple,
        )
    }
}

/// Reports `"21,4C"`, `"45.2%"` and `"1008.7hPa"` style strings.
#[derive(Debug)]
pub struct SyntheticTextDriver {
    climate: Climate,
}

fn formatted(value: f32, unit: &str, comma: bool) -> TextValue {
    let mut out = TextValue::new();
    let _ = write!(out, "{value:.1}{unit}");
    if comma {
        out = out.chars().map(|c| if c == '.' { ',' } else { c }).collect();
    }
    out
}

impl TextSensorDriver for SyntheticTextDriver {
    type Error = &'static str;

    async fn values(&mut self) -> Result<TextValues, &'static str> {
        let (temperature, humidity, pressure) = self.climate.next();
        Ok(TextValues {
            temperature: formatted(temperature, "C", true),
            humidity: formatted(humidity, "%", false),
            pressure: formatted(pressure, "hPa", false),
        })
    }
}

/// Reports floats with pressure in pascal.
#[derive(Debug)]
pub struct SyntheticFloatDriver {
    climate: Climate,
}

impl FloatSensorDriver for SyntheticFloatDriver {
    type Error = &'static str;

    async fn measure(&mut self) -> Result<FloatValues, &'static str> {
        let (temperature, humidity, pressure) = self.climate.next();
        Ok(FloatValues {
            temperature,
            humidity,
            pressure: pressure * 100.0,
        })
    }
}

/// Registry of the drivers "compiled into" a simulated build
pub struct SimDrivers {
    kind: Option<DriverKind>,
    cycle: u32,
}

impl SimDrivers {
    pub const fn new(kind: Option<DriverKind>, cycle: u32) -> Self {
        Self { kind, cycle }
    }
}

impl DriverRegistry for SimDrivers {
    type Text = SyntheticTextDriver;
    type Float = SyntheticFloatDriver;

    fn available(&self) -> Option<DriverKind> {
        self.kind
    }

    async fn bind(
        &mut self,
        kind: DriverKind,
        address: BusAddress,
    ) -> Result<SensorDriver<SyntheticTextDriver, SyntheticFloatDriver>, SensorError> {
        if address.role() != DeviceRole::SensorCandidate {
            return Err(SensorError::InitializationFailed {
                sensor: "BME280",
                details: "chip id mismatch",
            });
        }

        info!("Synthetic {:?} BME280 at {}", kind, address);
        let climate = Climate::new(self.cycle);
        Ok(match kind {
            DriverKind::Text => SensorDriver::Text(SyntheticTextDriver { climate }),
            DriverKind::Float => SensorDriver::Float(SyntheticFloatDriver { climate }),
        })
    }
}
