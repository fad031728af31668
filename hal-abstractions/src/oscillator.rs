//! Calibration register of the oscillator being trimmed

/// An oscillator whose frequency is tuned through an 8-bit register.
pub trait CalibratableOscillator {
    /// Value currently held by the calibration register.
    fn current(&self) -> u8;

    /// Write a new calibration value.
    ///
    /// Implementations must include whatever settling delay the hardware
    /// requires before the oscillator output can be trusted again.
    fn apply(&mut self, value: u8);
}

impl<T: CalibratableOscillator + ?Sized> CalibratableOscillator for &mut T {
    fn current(&self) -> u8 {
        (**self).current()
    }

    fn apply(&mut self, value: u8) {
        (**self).apply(value)
    }
}
