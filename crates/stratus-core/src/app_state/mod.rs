//! Wake-cycle state and error types for stratus

mod cycle;

pub use cycle::*;

use thiserror_no_std::Error;

use crate::display::{DisplayError, MSG_DRIVER_MISSING, MSG_SENSOR_MISSING};
use crate::network::NetworkError;
use crate::sensors::{CanonicalReading, SensorError};
use crate::telemetry::UploadError;

/// Stages of one wake cycle.
///
/// Every `*Missing`, `*Failed`, `*Timeout` or `NoBusDevices` state leads
/// straight to [`CycleState::SleepRetreat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Init,
    NoBusDevices,
    BusScanned,
    DisplayReady,
    NoDisplay,
    DriverLoaded,
    NoDriver,
    SensorResolved,
    SensorMissing,
    SampleFailed,
    Sampled,
    DisplayedReading,
    WifiConnected,
    WifiTimeout,
    Uploaded,
    UploadFailed,
    SleepRetreat,
}

/// How a wake cycle ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Reading acquired and accepted by the collector
    Success(CanonicalReading),
    NoBusDevices,
    NoSensorDriver,
    SensorNotFound,
    /// The sensor answered but its data was unusable
    ReadFailed,
    NetworkUnavailable,
    /// Reading acquired and shown, but the collector did not accept it
    UploadFailed,
}

impl CycleOutcome {
    /// Whether the cycle gave up before reaching the upload stage.
    pub const fn retreated_early(&self) -> bool {
        !matches!(self, Self::Success(_) | Self::UploadFailed)
    }
}

/// Faults that end a cycle with an immediate retreat to sleep
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CycleError {
    #[error("no I2C device answered the bus scan")]
    BusFault,
    #[error("no compatible sensor driver in this build")]
    DriverMissing,
    #[error("no sensor at a plausible address")]
    SensorNotFound,
    #[error("sensor read failed: {0}")]
    Read(SensorError),
    #[error("network unavailable: {0}")]
    Network(NetworkError),
}

/// Faults the cycle logs and carries on from
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Degraded {
    #[error("display unavailable: {0}")]
    Display(DisplayError),
    #[error("upload failed: {0}")]
    Upload(UploadError),
}

impl CycleError {
    /// Short notice shown on the display before retreating.
    pub const fn status_message(&self) -> Option<&'static str> {
        match self {
            Self::DriverMissing => Some(MSG_DRIVER_MISSING),
            Self::SensorNotFound => Some(MSG_SENSOR_MISSING),
            _ => None,
        }
    }

    const fn failure_state(&self) -> CycleState {
        match self {
            Self::BusFault => CycleState::NoBusDevices,
            Self::DriverMissing => CycleState::NoDriver,
            Self::SensorNotFound => CycleState::SensorMissing,
            Self::Read(_) => CycleState::SampleFailed,
            Self::Network(_) => CycleState::WifiTimeout,
        }
    }
}

impl From<CycleError> for CycleOutcome {
    fn from(error: CycleError) -> Self {
        match error {
            CycleError::BusFault => Self::NoBusDevices,
            CycleError::DriverMissing => Self::NoSensorDriver,
            CycleError::SensorNotFound => Self::SensorNotFound,
            CycleError::Read(_) => Self::ReadFailed,
            CycleError::Network(_) => Self::NetworkUnavailable,
        }
    }
}
