//! Board calibration settings
//!
//! HSI runs the core at 16 MHz with no PLL, so the bus clock TIM3 counts is
//! the oscillator under calibration. LSE is the 32.768 kHz crystal on
//! PC14/PC15.

use hal_abstractions::SubjectCounter;
use osccal_core::{CalibrationConfig, RangeLayout, SearchRange};

use crate::timers::{SubjectTimer, REFERENCE_MODULUS};

pub const HSI_FREQUENCY_HZ: u32 = 16_000_000;
pub const LSE_FREQUENCY_HZ: u32 = 32_768;

/// LSE needs seconds, not milliseconds, to reach a stable amplitude
pub const CRYSTAL_SETTLE_MS: u32 = 3000;

/// Backup register that keeps the selected trim
pub const BACKUP_REGISTER: u16 = 4;

pub const CALIBRATION: CalibrationConfig = CalibrationConfig {
    desired_frequency_hz: HSI_FREQUENCY_HZ,
    reference_frequency_hz: LSE_FREQUENCY_HZ,
    reference_modulus: REFERENCE_MODULUS,
    // HSITRIM is one 5-bit range centred on its reset value
    layout: RangeLayout::Single(SearchRange::new(16, 8)),
    storage_address: BACKUP_REGISTER,
    diagnostics_enabled: cfg!(debug_assertions),
};

// Readings fold back a single TIM3 wrap only
const _: () = assert!(CALIBRATION.target_fits(<SubjectTimer as SubjectCounter>::MODULUS));
