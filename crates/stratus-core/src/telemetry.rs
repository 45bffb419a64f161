//! openSenseMap telemetry
//!
//! One HTTP POST per cycle to `https://<host>/boxes/<box_id>/data` with a
//! JSON array holding one object per measured quantity:
//!
//! ```json
//! [{"sensor":"<id>","value":21.37},{"sensor":"<id>","value":1008.3},{"sensor":"<id>","value":43.1}]
//! ```
//!
//! Temperature is rounded to two decimals, pressure and humidity to one.
//! With `add_created_at` every object also carries a `createdAt` UTC
//! timestamp ending in `Z`.

use core::fmt::{self, Debug, Write};

use heapless::String;
use serde::Serialize;
use thiserror_no_std::Error;

use crate::config::TelemetryConfig;
use crate::sensors::CanonicalReading;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Upper bound for the encoded request body.
pub const MAX_PAYLOAD_LEN: usize = 512;

pub const MAX_URL_LEN: usize = 128;

pub type Url = String<MAX_URL_LEN>;

/// `YYYY-MM-DDTHH:MM:SSZ`
pub type Timestamp = String<20>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    #[error("request body does not fit the payload buffer")]
    Encode,
    #[error("endpoint URL does not fit the URL buffer")]
    Url,
    #[error("transport failed: {details}")]
    Transport { details: &'static str },
    #[error("collector answered HTTP {0}")]
    Status(u16),
}

/// HTTP client used for the single upload of a cycle
pub trait Uploader {
    type Error: Debug;

    /// POST `body` and return the HTTP status code.
    fn post(
        &mut self,
        url: &str,
        content_type: &str,
        body: &[u8],
    ) -> impl Future<Output = Result<u16, Self::Error>>;
}

/// Calendar time in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl UtcDateTime {
    pub fn to_iso8601(&self) -> Timestamp {
        let mut out = Timestamp::new();
        // Four-digit years fit exactly.
        let _ = write!(out, "{self}");
        out
    }
}

impl fmt::Display for UtcDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Source of wall-clock time, if the node has one
pub trait Clock {
    fn now(&mut self) -> Option<UtcDateTime>;
}

/// A node without a synchronized clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClock;

impl Clock for NoClock {
    fn now(&mut self) -> Option<UtcDateTime> {
        None
    }
}

/// One element of the request body
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Measurement<'a> {
    pub sensor: &'a str,
    pub value: f32,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<&'a str>,
}

/// Round to `decimals` places, ties to even.
///
/// Scaling happens in `f64` so an `f32` that only looks like a tie in
/// decimal (`2.675`) is not pushed across it.
pub fn round_to(value: f32, decimals: u32) -> f32 {
    let scale = f64::from(10_u32.pow(decimals));
    (libm::rint(f64::from(value) * scale) / scale) as f32
}

/// Measurements in upload order: temperature, pressure, humidity.
pub fn measurements<'a>(
    reading: &CanonicalReading,
    ids: &TelemetryConfig<'a>,
    created_at: Option<&'a str>,
) -> [Measurement<'a>; 3] {
    [
        Measurement {
            sensor: ids.temperature_sensor,
            value: round_to(reading.temperature, 2),
            created_at,
        },
        Measurement {
            sensor: ids.pressure_sensor,
            value: round_to(reading.pressure, 1),
            created_at,
        },
        Measurement {
            sensor: ids.humidity_sensor,
            value: round_to(reading.humidity, 1),
            created_at,
        },
    ]
}

/// Serialize the measurements into `buf`, returning the body length.
pub fn encode_payload(
    measurements: &[Measurement<'_>],
    buf: &mut [u8],
) -> Result<usize, UploadError> {
    serde_json_core::to_slice(&measurements, buf).map_err(|_| UploadError::Encode)
}

/// `https://<host>/boxes/<box_id>/data`
pub fn endpoint_url(host: &str, box_id: &str) -> Result<Url, UploadError> {
    let mut url = Url::new();
    write!(url, "https://{host}/boxes/{box_id}/data").map_err(|_| UploadError::Url)?;
    Ok(url)
}

/// 200 (OK) and 201 (Created) are the collector's success answers.
pub const fn is_success(status: u16) -> bool {
    matches!(status, 200 | 201)
}
