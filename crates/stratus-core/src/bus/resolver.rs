//! Static address-to-role resolution
//!
//! Two sensors sharing a family default address are indistinguishable; the
//! first one found wins.

use super::{BusAddress, ScanResult};
use core::ops::RangeInclusive;

/// BME280 default addresses in priority order.
pub const SENSOR_DEFAULTS: [u8; 2] = [0x76, 0x77];

/// PCF8574 (0x20..=0x27) and PCF8574A (0x38..=0x3F) backpack ranges.
pub const DISPLAY_RANGES: [RangeInclusive<u8>; 2] = [0x20..=0x27, 0x38..=0x3F];

/// Factory-default backpack addresses in priority order.
pub const DISPLAY_DEFAULTS: [u8; 2] = [0x27, 0x3F];

pub(crate) fn is_display_range(raw: u8) -> bool {
    DISPLAY_RANGES.iter().any(|range| range.contains(&raw))
}

/// Roles assigned to the addresses of one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressPlan {
    pub sensor: Option<BusAddress>,
    pub display: Option<BusAddress>,
}

/// Pick the sensor address: a family default if present, else the first
/// responder.
pub fn resolve_sensor(scan: &[BusAddress]) -> Option<BusAddress> {
    SENSOR_DEFAULTS
        .iter()
        .find_map(|&preferred| scan.iter().copied().find(|a| a.get() == preferred))
        .or_else(|| scan.first().copied())
}

/// Pick the display address.
///
/// A configured override always wins. Otherwise only addresses inside the
/// backpack ranges qualify; the factory defaults are preferred over the
/// first in-range responder.
pub fn resolve_display(
    scan: &[BusAddress],
    address_override: Option<BusAddress>,
) -> Option<BusAddress> {
    if address_override.is_some() {
        return address_override;
    }

    let mut candidates = scan.iter().copied().filter(|a| is_display_range(a.get()));

    DISPLAY_DEFAULTS
        .iter()
        .find_map(|&preferred| scan.iter().copied().find(|a| a.get() == preferred))
        .or_else(|| candidates.next())
}

/// Both resolutions at once. `None` when the scan came back empty, which
/// the caller must treat as a bus fault.
pub fn resolve(scan: &ScanResult, display_override: Option<BusAddress>) -> Option<AddressPlan> {
    if scan.is_empty() {
        return None;
    }

    Some(AddressPlan {
        sensor: resolve_sensor(scan),
        display: resolve_display(scan, display_override),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_of(raw: &[u8]) -> ScanResult {
        let mut scan = ScanResult::new();
        for &a in raw {
            scan.push(BusAddress::new(a).unwrap()).unwrap();
        }
        scan.sort_unstable();
        scan
    }

    fn addr(raw: u8) -> Option<BusAddress> {
        BusAddress::new(raw)
    }

    #[test]
    fn test_sensor_and_display() {
        let plan = resolve(&scan_of(&[0x76, 0x27]), None).unwrap();
        assert_eq!(plan.sensor, addr(0x76));
        assert_eq!(plan.display, addr(0x27));
    }

    #[test]
    fn test_secondary_sensor_without_display() {
        let plan = resolve(&scan_of(&[0x77]), None).unwrap();
        assert_eq!(plan.sensor, addr(0x77));
        assert_eq!(plan.display, None);
    }

    #[test]
    fn test_empty_scan_is_a_fault() {
        assert_eq!(resolve(&ScanResult::new(), None), None);
        assert_eq!(resolve_sensor(&[]), None);
    }

    #[test]
    fn test_primary_sensor_address_wins() {
        assert_eq!(resolve_sensor(&scan_of(&[0x77, 0x76])), addr(0x76));
    }

    #[test]
    fn test_sensor_falls_back_to_first_responder() {
        assert_eq!(resolve_sensor(&scan_of(&[0x48, 0x27])), addr(0x27));
    }

    #[test]
    fn test_display_default_beats_first_candidate() {
        assert_eq!(resolve_display(&scan_of(&[0x22, 0x3F]), None), addr(0x3F));
        assert_eq!(resolve_display(&scan_of(&[0x3F, 0x27]), None), addr(0x27));
    }

    #[test]
    fn test_display_first_in_range_candidate() {
        assert_eq!(resolve_display(&scan_of(&[0x10, 0x39, 0x76]), None), addr(0x39));
    }

    #[test]
    fn test_display_ignores_out_of_range() {
        assert_eq!(resolve_display(&scan_of(&[0x28, 0x37, 0x40, 0x76]), None), None);
    }

    #[test]
    fn test_display_override_is_unconditional() {
        assert_eq!(resolve_display(&scan_of(&[0x27]), addr(0x3C)), addr(0x3C));
        assert_eq!(resolve_display(&[], addr(0x3C)), addr(0x3C));
    }
}
