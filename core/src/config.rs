//! Calibration configuration

use crate::types::RangeLayout;

/// Subject-counter reading expected over one full reference-counter cycle
/// when the oscillator runs at exactly `desired_hz`.
///
/// `reference_modulus` is the number of reference counts per cycle.
pub const fn target_count(desired_hz: u32, reference_hz: u32, reference_modulus: u32) -> u32 {
    desired_hz / (reference_hz / reference_modulus)
}

/// Compile-time calibration settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationConfig {
    /// Frequency the oscillator should be trimmed to
    pub desired_frequency_hz: u32,
    /// Frequency of the external reference (usually a watch crystal)
    pub reference_frequency_hz: u32,
    /// Counts per reference-counter cycle
    pub reference_modulus: u32,
    /// Calibration ranges to search
    pub layout: RangeLayout,
    /// Address of the persisted calibration byte
    pub storage_address: u16,
    /// Forward progress to the diagnostics channel
    pub diagnostics_enabled: bool,
}

impl CalibrationConfig {
    /// 8 MHz RC oscillator against a 32.768 kHz crystal on an 8-bit counter,
    /// dual-range register, result at storage address 4.
    pub const DEFAULT: Self = Self {
        desired_frequency_hz: 8_000_000,
        reference_frequency_hz: 32_768,
        reference_modulus: 256,
        layout: RangeLayout::Dual,
        storage_address: 0x04,
        diagnostics_enabled: false,
    };

    /// Expected subject count for this configuration.
    pub const fn target_count(&self) -> u32 {
        target_count(
            self.desired_frequency_hz,
            self.reference_frequency_hz,
            self.reference_modulus,
        )
    }

    /// Whether the target count stays below one wrap of a subject counter
    /// with `subject_modulus` counts.
    ///
    /// Readings are folded back over a single overflow only. A target near
    /// twice the modulus lets a fast oscillator wrap twice and read as slow.
    pub const fn target_fits(&self, subject_modulus: u64) -> bool {
        (self.target_count() as u64) < subject_modulus
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
