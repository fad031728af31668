//! HSI trimming as the calibration register
//!
//! RCC_CR.HSITRIM is five bits wide; the factory value sits in HSICAL and
//! the reset trim is 16 (mid-scale).

use embassy_stm32::pac::RCC;
use hal_abstractions::CalibratableOscillator;

/// Widest value HSITRIM accepts
pub const TRIM_MAX: u8 = 0x1F;

/// Exclusive handle to the HSI trim field
pub struct HsiTrim {
    _private: (),
}

impl HsiTrim {
    /// Only one instance may exist; `init` constructs it once.
    pub(crate) const fn new() -> Self {
        Self { _private: () }
    }

    /// Factory calibration programmed into HSICAL
    pub fn factory_calibration(&self) -> u8 {
        RCC.cr().read().hsical()
    }
}

impl CalibratableOscillator for HsiTrim {
    fn current(&self) -> u8 {
        RCC.cr().read().hsitrim()
    }

    fn apply(&mut self, value: u8) {
        RCC.cr().modify(|w| w.set_hsitrim(value & TRIM_MAX));
        // one cycle for the RC to follow the new trim
        cortex_m::asm::nop();
    }
}
