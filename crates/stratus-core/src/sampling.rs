//! Sampling engine
//!
//! One stabilized reading per wake cycle: wait for the sensor to settle,
//! take a fixed number of spaced samples and reduce them to a per-field
//! arithmetic mean. There is no outlier rejection and no partial success;
//! the first failing sample aborts the whole run.

use embedded_hal_async::delay::DelayNs;
use log::{debug, info};

use crate::config::SamplingConfig;
use crate::sensors::{CanonicalReading, Sensor, SensorError};

/// Running sums of at most `capacity` readings
#[derive(Debug, Clone, Copy)]
pub struct SampleAccumulator {
    temperature: f32,
    humidity: f32,
    pressure: f32,
    count: usize,
    capacity: usize,
}

impl SampleAccumulator {
    pub const fn new(capacity: usize) -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
            pressure: 0.0,
            count: 0,
            capacity,
        }
    }

    pub const fn len(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub const fn is_full(&self) -> bool {
        self.count >= self.capacity
    }

    /// Add one reading. Returns `false` and leaves the sums untouched once
    /// `capacity` readings have been accumulated.
    pub fn push(&mut self, reading: &CanonicalReading) -> bool {
        if self.is_full() {
            return false;
        }

        self.temperature += reading.temperature;
        self.humidity += reading.humidity;
        self.pressure += reading.pressure;
        self.count += 1;
        true
    }

    /// Consume the accumulator and return the per-field mean.
    pub fn mean(self) -> Option<CanonicalReading> {
        if self.is_empty() {
            return None;
        }

        let n = self.count as f32;
        Some(CanonicalReading {
            temperature: self.temperature / n,
            humidity: self.humidity / n,
            pressure: self.pressure / n,
        })
    }
}

/// Settle, sample and average.
pub async fn sample<S, D>(
    sensor: &mut S,
    delay: &mut D,
    config: &SamplingConfig,
) -> Result<CanonicalReading, SensorError>
where
    S: Sensor,
    D: DelayNs,
{
    let count = config.sample_count();
    let mut accumulator = SampleAccumulator::new(count);

    delay.delay_ms(config.settle_ms).await;

    for i in 0..count {
        if i > 0 {
            delay.delay_ms(config.spacing_ms).await;
        }

        let reading = sensor.read().await?;
        debug!(
            "Sample {}/{}: {:.2} C {:.2} % {:.2} hPa",
            i + 1,
            count,
            reading.temperature,
            reading.humidity,
            reading.pressure
        );
        accumulator.push(&reading);
    }

    let mean = accumulator.mean().ok_or(SensorError::ReadFailed {
        sensor: "BME280",
        operation: "average samples",
        details: "no samples taken",
    })?;

    info!("{:>9}  {:>8}  {:>8}", "Temp [°C]", "rF [%]", "p [hPa]");
    info!(
        "{:>9.2}  {:>8.2}  {:>8.2}",
        mean.temperature, mean.humidity, mean.pressure
    );

    Ok(mean)
}
