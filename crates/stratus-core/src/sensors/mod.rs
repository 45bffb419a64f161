//! Sensor adapter
//!
//! Two incompatible driver conventions exist for the same physical part:
//! one reports three formatted strings (`"24.5C"`, `"40.1%"`, `"1008.3hPa"`),
//! the other typed floats with pressure in pascal. [`SensorDriver`] is the
//! closed union of both, resolved once per cycle by a [`DriverRegistry`], and
//! its [`Sensor::read`] is the single seam that yields a [`CanonicalReading`].

#[cfg(feature = "sensor-bme280")]
pub mod bme280;

use core::convert::Infallible;
use core::fmt::Debug;

use heapless::String;
use log::{error, warn};
use thiserror_no_std::Error;

use crate::bus::BusAddress;
use crate::normalize::{ParseError, parse_scalar};

/// Capacity of one formatted value reported by a text-shaped driver.
pub const TEXT_VALUE_LEN: usize = 16;

pub type TextValue = String<TEXT_VALUE_LEN>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor} initialization failed: {details}")]
    InitializationFailed {
        sensor: &'static str,
        details: &'static str,
    },
    #[error("{sensor} read failed during {operation}: {details}")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
    /// A reported field could not be normalized into a finite number
    #[error("{field} value unusable: {reason}")]
    Malformed {
        field: &'static str,
        reason: ParseError,
    },
}

/// Unit-normalized reading used by everything downstream of the adapter
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanonicalReading {
    /// °C
    pub temperature: f32,
    /// % relative humidity
    pub humidity: f32,
    /// hPa
    pub pressure: f32,
}

/// Output of a text-shaped driver, fields named by quantity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextValues {
    pub temperature: TextValue,
    pub humidity: TextValue,
    /// Already expressed in hPa, unit suffix included
    pub pressure: TextValue,
}

/// Output of a float-shaped driver
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloatValues {
    /// °C
    pub temperature: f32,
    /// %
    pub humidity: f32,
    /// Pa
    pub pressure: f32,
}

/// A driver's native output, consumed immediately by normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawReading {
    Text(TextValues),
    Float(FloatValues),
}

impl RawReading {
    /// Convert into canonical units. Pressure from a float driver is
    /// divided by 100 (Pa to hPa); text pressure is taken as hPa.
    pub fn normalize(&self) -> Result<CanonicalReading, SensorError> {
        match self {
            Self::Text(values) => {
                let field = |field: &'static str, raw: &TextValue| {
                    parse_scalar(raw).map_err(|reason| SensorError::Malformed { field, reason })
                };

                let reading = field("temperature", &values.temperature).and_then(|temperature| {
                    Ok(CanonicalReading {
                        temperature,
                        humidity: field("humidity", &values.humidity)?,
                        pressure: field("pressure", &values.pressure)?,
                    })
                });

                if let Err(e) = &reading {
                    warn!(
                        "Raw values: {:?} {:?} {:?}",
                        values.temperature.as_str(),
                        values.humidity.as_str(),
                        values.pressure.as_str()
                    );
                    error!("Sensor values rejected: {}", e);
                }
                reading
            }
            Self::Float(values) => {
                let finite = |field: &'static str, value: f32| {
                    if value.is_finite() {
                        Ok(value)
                    } else {
                        error!("Sensor reported non-finite {}: {}", field, value);
                        Err(SensorError::Malformed {
                            field,
                            reason: ParseError::Malformed,
                        })
                    }
                };

                Ok(CanonicalReading {
                    temperature: finite("temperature", values.temperature)?,
                    humidity: finite("humidity", values.humidity)?,
                    pressure: finite("pressure", values.pressure)? / 100.0,
                })
            }
        }
    }
}

/// Anything that yields one canonical reading per call.
pub trait Sensor {
    fn read(&mut self) -> impl Future<Output = Result<CanonicalReading, SensorError>>;
}

/// Driver convention that reports formatted strings
pub trait TextSensorDriver {
    type Error: Debug;

    fn values(&mut self) -> impl Future<Output = Result<TextValues, Self::Error>>;
}

/// Driver convention that reports typed floats, pressure in pascal
pub trait FloatSensorDriver {
    type Error: Debug;

    fn measure(&mut self) -> impl Future<Output = Result<FloatValues, Self::Error>>;
}

/// Which driver convention a build or a bound driver uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    Text,
    Float,
}

/// A bound sensor driver of either convention
pub enum SensorDriver<T, F> {
    Text(T),
    Float(F),
}

impl<T, F> SensorDriver<T, F>
where
    T: TextSensorDriver,
    F: FloatSensorDriver,
{
    pub fn kind(&self) -> DriverKind {
        match self {
            Self::Text(_) => DriverKind::Text,
            Self::Float(_) => DriverKind::Float,
        }
    }

    /// Fetch the driver's native output without normalizing it.
    pub async fn read_raw(&mut self) -> Result<RawReading, SensorError> {
        match self {
            Self::Text(driver) => driver.values().await.map(RawReading::Text).map_err(|e| {
                error!("Text sensor driver failed: {:?}", e);
                SensorError::ReadFailed {
                    sensor: "BME280",
                    operation: "read formatted values",
                    details: "driver error",
                }
            }),
            Self::Float(driver) => driver.measure().await.map(RawReading::Float).map_err(|e| {
                error!("Float sensor driver failed: {:?}", e);
                SensorError::ReadFailed {
                    sensor: "BME280",
                    operation: "measure",
                    details: "driver error",
                }
            }),
        }
    }
}

impl<T, F> Sensor for SensorDriver<T, F>
where
    T: TextSensorDriver,
    F: FloatSensorDriver,
{
    async fn read(&mut self) -> Result<CanonicalReading, SensorError> {
        self.read_raw().await?.normalize()
    }
}

/// The drivers a build can bind at runtime.
pub trait DriverRegistry {
    type Text: TextSensorDriver;
    type Float: FloatSensorDriver;

    /// Preferred available driver convention, `None` if the build carries no
    /// compatible sensor driver at all.
    fn available(&self) -> Option<DriverKind>;

    /// Construct a driver of `kind` for the device at `address`.
    fn bind(
        &mut self,
        kind: DriverKind,
        address: BusAddress,
    ) -> impl Future<Output = Result<SensorDriver<Self::Text, Self::Float>, SensorError>>;
}

/// Stand-in for a driver convention a build does not carry.
#[derive(Debug)]
pub enum Unsupported {}

impl TextSensorDriver for Unsupported {
    type Error = Infallible;

    async fn values(&mut self) -> Result<TextValues, Infallible> {
        match *self {}
    }
}

impl FloatSensorDriver for Unsupported {
    type Error = Infallible;

    async fn measure(&mut self) -> Result<FloatValues, Infallible> {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFloatDriver, FakeTextDriver, text_values};
    use embassy_futures::block_on;

    type TextOnly = SensorDriver<FakeTextDriver, Unsupported>;
    type FloatOnly = SensorDriver<Unsupported, FakeFloatDriver>;

    #[test]
    fn test_float_pressure_is_converted_to_hpa() {
        let mut driver = FloatOnly::Float(FakeFloatDriver::constant(FloatValues {
            temperature: 21.5,
            humidity: 45.0,
            pressure: 100_800.0,
        }));

        let reading = block_on(driver.read()).unwrap();
        assert_eq!(reading.pressure, 1008.0);
        assert_eq!(reading.temperature, 21.5);
        assert_eq!(reading.humidity, 45.0);
        assert_eq!(driver.kind(), DriverKind::Float);
    }

    #[test]
    fn test_text_values_are_normalized() {
        let mut driver = TextOnly::Text(FakeTextDriver::constant(text_values(
            "24,5C", "40.1%", "1008.3hPa",
        )));

        let reading = block_on(driver.read()).unwrap();
        assert_eq!(reading.temperature, 24.5);
        assert_eq!(reading.humidity, 40.1);
        assert_eq!(reading.pressure, 1008.3);
        assert_eq!(driver.kind(), DriverKind::Text);
    }

    #[test]
    fn test_unparseable_field_fails_with_its_name() {
        let raw = RawReading::Text(text_values("24.5C", "%", "1008.3hPa"));
        assert_eq!(
            raw.normalize(),
            Err(SensorError::Malformed {
                field: "humidity",
                reason: ParseError::NoDigits,
            })
        );
    }

    #[test]
    fn test_non_finite_float_is_rejected() {
        let raw = RawReading::Float(FloatValues {
            temperature: f32::NAN,
            humidity: 40.0,
            pressure: 100_000.0,
        });
        assert!(matches!(
            raw.normalize(),
            Err(SensorError::Malformed { field: "temperature", .. })
        ));
    }

    #[test]
    fn test_driver_failure_is_a_read_error() {
        let mut driver = FloatOnly::Float(FakeFloatDriver::failing());
        assert!(matches!(
            block_on(driver.read()),
            Err(SensorError::ReadFailed { .. })
        ));
    }
}
