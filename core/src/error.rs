//! Calibration error types

#[cfg(feature = "defmt")]
use defmt::Format;

/// Errors reported by hardened wait strategies
///
/// The default spinning strategy never fails; it hangs instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum CalibrationError {
    /// A counter never signalled within the polling budget. The reference
    /// source is most likely absent or miswired.
    HardwareDesync {
        /// Polls spent before giving up
        polls: u32,
    },
}

impl core::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::HardwareDesync { polls } => {
                write!(f, "Counter hardware did not respond after {} polls", polls)
            }
        }
    }
}

// Implement core::error::Error for no_std compatibility
impl core::error::Error for CalibrationError {}
