//! Compile-time node secrets
//!
//! `build.rs` loads `.env` and exports every key as a rustc environment
//! variable, so credentials never live in the source tree.

use stratus_core::NodeConfig;
use stratus_core::config::{InternetConfig, TelemetryConfig};

pub const WIFI_SSID: &str = env!("STRATUS_WIFI_SSID");
pub const WIFI_PASSWORD: &str = env!("STRATUS_WIFI_PASSWORD");

/// openSenseMap box id
pub const BOX_ID: &str = env!("STRATUS_BOX_ID");
pub const SENSOR_TEMPERATURE: &str = env!("STRATUS_SENSOR_TEMPERATURE");
pub const SENSOR_PRESSURE: &str = env!("STRATUS_SENSOR_PRESSURE");
pub const SENSOR_HUMIDITY: &str = env!("STRATUS_SENSOR_HUMIDITY");

/// Defaults plus the baked-in credentials and sensor ids.
pub fn node_config() -> NodeConfig<'static> {
    NodeConfig {
        internet: InternetConfig {
            ssid: WIFI_SSID,
            password: WIFI_PASSWORD,
            ..InternetConfig::default()
        },
        telemetry: TelemetryConfig {
            box_id: BOX_ID,
            temperature_sensor: SENSOR_TEMPERATURE,
            pressure_sensor: SENSOR_PRESSURE,
            humidity_sensor: SENSOR_HUMIDITY,
            ..TelemetryConfig::default()
        },
        ..NodeConfig::default()
    }
}
