//! Owned handle over the oscillator's calibration register

use hal_abstractions::CalibratableOscillator;

use crate::types::CalibrationValue;

/// Threads the calibration register through the calibration call chain and
/// remembers the value last written to it.
pub struct OscillatorHandle<O> {
    oscillator: O,
    applied: CalibrationValue,
}

impl<O: CalibratableOscillator> OscillatorHandle<O> {
    /// Take ownership of the oscillator. The current register content counts
    /// as applied.
    pub fn new(oscillator: O) -> Self {
        let applied = oscillator.current();
        Self {
            oscillator,
            applied,
        }
    }

    /// Write `value` to the calibration register.
    pub fn apply(&mut self, value: CalibrationValue) {
        self.oscillator.apply(value);
        self.applied = value;
    }

    /// Value most recently written through this handle.
    pub fn applied(&self) -> CalibrationValue {
        self.applied
    }

    pub fn into_inner(self) -> O {
        self.oscillator
    }
}
