//! Bakes node secrets from `.env` (or the build environment) into the binary.

use std::env;

/// Keys read by `stratus_firmware::wifi_secrets`.
const SECRET_KEYS: [&str; 6] = [
    "STRATUS_WIFI_SSID",
    "STRATUS_WIFI_PASSWORD",
    "STRATUS_BOX_ID",
    "STRATUS_SENSOR_TEMPERATURE",
    "STRATUS_SENSOR_PRESSURE",
    "STRATUS_SENSOR_HUMIDITY",
];

fn main() {
    println!("cargo:rerun-if-changed=.env");

    if let Err(e) = dotenvy::dotenv() {
        println!("cargo:warning=no .env loaded ({e}), using build environment only");
    }

    for key in SECRET_KEYS {
        println!("cargo:rerun-if-env-changed={key}");
        let value = env::var(key).unwrap_or_default();
        if value.is_empty() {
            println!("cargo:warning={key} is not set");
        }
        println!("cargo:rustc-env={key}={value}");
    }

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
