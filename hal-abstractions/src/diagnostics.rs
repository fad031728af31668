//! Optional human-readable diagnostics output
//!
//! Nothing here participates in calibration. Every method defaults to a
//! no-op so a channel only implements the events it cares about.

/// Sink for calibration progress reports.
pub trait DiagnosticsChannel {
    /// `true` if the channel's bit timing is derived from the oscillator
    /// being calibrated (e.g. a UART on the trimmed system clock).
    ///
    /// The evaluator then restores the factory calibration value while a
    /// report is written.
    fn clock_sensitive(&self) -> bool {
        false
    }

    /// Calibration value found in the register at startup.
    fn factory_value(&mut self, _value: u8) {}

    /// One evaluated candidate and its signed error.
    fn tried(&mut self, _value: u8, _error: i32) {}

    /// The value chosen at the end of the run.
    fn selected(&mut self, _value: u8) {}
}

impl<T: DiagnosticsChannel + ?Sized> DiagnosticsChannel for &mut T {
    fn clock_sensitive(&self) -> bool {
        (**self).clock_sensitive()
    }

    fn factory_value(&mut self, value: u8) {
        (**self).factory_value(value)
    }

    fn tried(&mut self, value: u8, error: i32) {
        (**self).tried(value, error)
    }

    fn selected(&mut self, value: u8) {
        (**self).selected(value)
    }
}
