//! I2C bus discovery
//!
//! The node never negotiates with its peripherals to find out what they are.
//! A scan collects every 7-bit address that acknowledges, and the static
//! tables in [`resolver`] decide which address is the sensor and which one
//! the character display.

pub mod resolver;

use core::fmt;

use embedded_hal_async::i2c::I2c;
use heapless::Vec;
use log::{debug, info};

pub use resolver::{AddressPlan, resolve, resolve_display, resolve_sensor};

/// Lowest address probed by [`scan`]; 0x00..=0x07 are reserved.
pub const SCAN_FIRST: u8 = 0x08;
/// Highest address probed by [`scan`]; 0x78..=0x7F are reserved.
pub const SCAN_LAST: u8 = 0x77;

/// Upper bound of responding devices on one bus.
pub const MAX_DEVICES: usize = (SCAN_LAST - SCAN_FIRST + 1) as usize;

/// Addresses that acknowledged during a scan, in ascending order.
pub type ScanResult = Vec<BusAddress, MAX_DEVICES>;

/// A 7-bit I2C device address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BusAddress(u8);

impl BusAddress {
    /// Wrap a raw address, rejecting anything outside the 7-bit range.
    pub const fn new(raw: u8) -> Option<Self> {
        if raw <= 0x7F { Some(Self(raw)) } else { None }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Role suggested by the static address tables.
    pub fn role(self) -> DeviceRole {
        if resolver::SENSOR_DEFAULTS.contains(&self.0) {
            DeviceRole::SensorCandidate
        } else if resolver::is_display_range(self.0) {
            DeviceRole::DisplayCandidate
        } else {
            DeviceRole::Unknown
        }
    }
}

impl fmt::Display for BusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.0)
    }
}

/// Role of a discovered address, derived from address tables only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRole {
    SensorCandidate,
    DisplayCandidate,
    Unknown,
}

/// Probe every non-reserved address and collect the ones that acknowledge.
///
/// Each probe is an address-only write; a NACK or any other transfer error
/// counts as "nobody home". An empty result is the caller's business: the
/// cycle controller treats it as a wiring fault.
pub async fn scan<I: I2c>(bus: &mut I) -> ScanResult {
    let mut found = ScanResult::new();

    for raw in SCAN_FIRST..=SCAN_LAST {
        if bus.write(raw, &[]).await.is_ok() {
            // Capacity covers the whole probed range.
            let _ = found.push(BusAddress(raw));
        } else {
            debug!("I2C: no ACK at 0x{:02x}", raw);
        }
    }

    info!("I2C: {}", ScanDisplay(&found));
    found
}

/// Formats a scan as `[0x27, 0x76]`.
pub struct ScanDisplay<'a>(pub &'a [BusAddress]);

impl fmt::Display for ScanDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, address) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{address}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBus;
    use embassy_futures::block_on;

    #[test]
    fn test_address_range() {
        assert_eq!(BusAddress::new(0x7F).map(BusAddress::get), Some(0x7F));
        assert_eq!(BusAddress::new(0x80), None);
    }

    #[test]
    fn test_roles() {
        let role = |raw| BusAddress::new(raw).unwrap().role();
        assert_eq!(role(0x76), DeviceRole::SensorCandidate);
        assert_eq!(role(0x77), DeviceRole::SensorCandidate);
        assert_eq!(role(0x27), DeviceRole::DisplayCandidate);
        assert_eq!(role(0x38), DeviceRole::DisplayCandidate);
        assert_eq!(role(0x48), DeviceRole::Unknown);
    }

    #[test]
    fn test_scan_reports_ascending_responders() {
        let mut bus = FakeBus::with_devices(&[0x76, 0x27, 0x3C]);
        let found = block_on(scan(&mut bus));
        let raw: std::vec::Vec<u8> = found.iter().map(|a| a.get()).collect();
        assert_eq!(raw, [0x27, 0x3C, 0x76]);
    }

    #[test]
    fn test_scan_skips_reserved_addresses() {
        let mut bus = FakeBus::with_devices(&[0x03, 0x7A]);
        let found = block_on(scan(&mut bus));
        assert!(found.is_empty());
    }

    #[test]
    fn test_empty_bus() {
        let mut bus = FakeBus::with_devices(&[]);
        assert!(block_on(scan(&mut bus)).is_empty());
        assert_eq!(bus.probes(), MAX_DEVICES);
    }

    #[test]
    fn test_scan_display() {
        let found = [BusAddress(0x27), BusAddress(0x76)];
        assert_eq!(std::format!("{}", ScanDisplay(&found)), "[0x27, 0x76]");
    }
}
