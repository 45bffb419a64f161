//! Low-power retreat
//!
//! Deep sleep halts the chip and resumes at the program entry point after a
//! fixed duration. The cycle controller calls it exactly once per wake, from
//! a single exit point; no other component may.

/// The platform's deep-sleep primitive
pub trait DeepSleep {
    /// Enter deep sleep for `duration_ms`.
    ///
    /// On hardware this does not return. Host bindings record the request
    /// and return so the caller can wind down.
    fn sleep(&mut self, duration_ms: u32);
}
