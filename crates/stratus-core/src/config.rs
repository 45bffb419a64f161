//! Node configuration
//!
//! Everything the wake cycle can be tuned with. The firmware builds a
//! [`NodeConfig`] from compile-time secrets, the simulator from its defaults
//! and command line. All string fields borrow so a configuration can be
//! deserialized straight out of a flash or file buffer.

use serde::{Deserialize, Serialize};

use crate::bus::BusAddress;

/// Default deep-sleep duration between wake cycles (1 minute).
pub const DEFAULT_SLEEP_MS: u32 = 60_000;

/// Default openSenseMap API host.
pub const DEFAULT_TELEMETRY_HOST: &str = "api.opensensemap.org";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct NodeConfig<'a> {
    pub bus: BusConfig,
    /// Deep-sleep duration used on every exit path
    pub sleep_ms: u32,
    pub display: DisplayConfig,
    pub sampling: SamplingConfig,
    pub internet: InternetConfig<'a>,
    pub telemetry: TelemetryConfig<'a>,
}

impl Default for NodeConfig<'_> {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            sleep_ms: DEFAULT_SLEEP_MS,
            display: DisplayConfig::default(),
            sampling: SamplingConfig::default(),
            internet: InternetConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// I2C pin assignment and clock
///
/// On firmware the pins are fixed by the board wiring; the configured pair is
/// only checked against it with [`BusConfig::wired_to`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    pub sda_pin: u8,
    pub scl_pin: u8,
    pub frequency_hz: u32,
}

impl BusConfig {
    /// Whether the configured pins are the ones the bus is wired to.
    pub const fn wired_to(&self, sda_pin: u8, scl_pin: u8) -> bool {
        self.sda_pin == sda_pin && self.scl_pin == scl_pin
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            sda_pin: 21,
            scl_pin: 22,
            frequency_hz: 100_000,
        }
    }
}

/// Character display geometry
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub cols: u8,
    pub rows: u8,
    /// Fixed display address; skips auto-detection when set
    pub address_override: Option<u8>,
    /// How long status messages stay visible before the next step
    pub hold_ms: u32,
}

impl DisplayConfig {
    /// The override as a bus address, ignoring values outside the 7-bit range.
    pub fn address_override(&self) -> Option<BusAddress> {
        self.address_override.and_then(BusAddress::new)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            cols: 16,
            rows: 2,
            address_override: None,
            hold_ms: 3_000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Wait after driver selection before the first sample is trusted
    pub settle_ms: u32,
    pub samples: u8,
    /// Pause between two consecutive samples
    pub spacing_ms: u32,
}

impl SamplingConfig {
    /// Number of samples to average; never zero.
    pub fn sample_count(&self) -> usize {
        usize::from(self.samples.max(1))
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 150,
            samples: 3,
            spacing_ms: 30,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternetConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
    /// Upper bound for the association wait
    pub connect_timeout_ms: u32,
    pub poll_interval_ms: u32,
    /// Pause before retreating after an association timeout
    pub timeout_pause_ms: u32,
}

impl Default for InternetConfig<'_> {
    fn default() -> Self {
        Self {
            ssid: "",
            password: "",
            connect_timeout_ms: 20_000,
            poll_interval_ms: 200,
            timeout_pause_ms: 500,
        }
    }
}

/// openSenseMap box and sensor identifiers
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryConfig<'a> {
    pub host: &'a str,
    pub box_id: &'a str,
    pub temperature_sensor: &'a str,
    pub pressure_sensor: &'a str,
    pub humidity_sensor: &'a str,
    /// Attach a `createdAt` UTC timestamp to every measurement
    pub add_created_at: bool,
}

impl Default for TelemetryConfig<'_> {
    fn default() -> Self {
        Self {
            host: DEFAULT_TELEMETRY_HOST,
            box_id: "",
            temperature_sensor: "",
            pressure_sensor: "",
            humidity_sensor: "",
            add_created_at: false,
        }
    }
}
