//! Host stand-ins for the radio, uplink, clock, timers and deep sleep

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Datelike, Timelike, Utc};

use embedded_hal_async::delay::DelayNs;
use log::{info, warn};
use stratus_core::network::Network;
use stratus_core::power::DeepSleep;
use stratus_core::telemetry::{Clock, Uploader, UtcDateTime};

/// Simulated time runs this many times faster than wall time.
pub const TIME_SCALE: u32 = 100;

/// Blocking delay, compressed by [`TIME_SCALE`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HostDelay;

impl DelayNs for HostDelay {
    async fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns / TIME_SCALE)));
    }

    async fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_micros(u64::from(ms) * 1000 / u64::from(TIME_SCALE)));
    }
}

/// Access point that associates after a few status polls, or never.
#[derive(Debug)]
pub struct SimNetwork {
    up_after_polls: Option<u32>,
    polls: u32,
    started: bool,
}

impl SimNetwork {
    pub const fn new(up_after_polls: Option<u32>) -> Self {
        Self {
            up_after_polls,
            polls: 0,
            started: false,
        }
    }
}

impl Network for SimNetwork {
    type Error = &'static str;

    async fn is_connected(&mut self) -> Result<bool, &'static str> {
        if !self.started {
            return Ok(false);
        }
        self.polls += 1;
        Ok(self.up_after_polls.is_some_and(|needed| self.polls >= needed))
    }

    async fn connect(&mut self, ssid: &str, _password: &str) -> Result<(), &'static str> {
        info!("Associating with {:?}", ssid);
        self.started = true;
        Ok(())
    }
}

/// Prints the request and answers with a fixed status.
#[derive(Debug)]
pub struct LoggingUploader {
    status: u16,
}

impl LoggingUploader {
    pub const fn new(status: u16) -> Self {
        Self { status }
    }
}

impl Uploader for LoggingUploader {
    type Error = &'static str;

    async fn post(
        &mut self,
        url: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<u16, &'static str> {
        info!("POST {} [{}]", url, content_type);
        info!("  {}", String::from_utf8_lossy(body));
        Ok(self.status)
    }
}

/// System clock in UTC
#[derive(Debug, Default, Clone, Copy)]
pub struct HostClock;

impl Clock for HostClock {
    fn now(&mut self) -> Option<UtcDateTime> {
        calendar_fields(&Utc::now())
    }
}

/// Copy a UTC timestamp into the node's calendar fields.
///
/// `None` for years the node cannot represent.
pub fn calendar_fields(t: &DateTime<Utc>) -> Option<UtcDateTime> {
    Some(UtcDateTime {
        year: u16::try_from(t.year()).ok()?,
        month: t.month() as u8,
        day: t.day() as u8,
        hour: t.hour() as u8,
        minute: t.minute() as u8,
        second: t.second() as u8,
    })
}

/// Logs the sleep request instead of powering down.
#[derive(Debug, Default)]
pub struct LoggedSleeper {
    requests: u32,
}

impl LoggedSleeper {
    pub const fn requests(&self) -> u32 {
        self.requests
    }
}

impl DeepSleep for LoggedSleeper {
    fn sleep(&mut self, duration_ms: u32) {
        self.requests += 1;
        if self.requests > 1 {
            warn!("Deep sleep requested {} times in one wake", self.requests);
        }
        info!("Deep sleep for {} s (simulated)", duration_ms / 1000);
    }
}
