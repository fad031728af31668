//! Diagnostics channels
//!
//! - [`NoDiagnostics`]: discards everything (the default)
//! - [`LogDiagnostics`]: forwards reports to the crate's logger (`defmt` or
//!   `log`), independent of the oscillator being trimmed
//! - [`SerialDiagnostics`]: ASCII lines over any `embedded_io::Write` port
//!
//! Serial lines are:
//!
//! ```text
//! factory value = 155
//! tried 64, result = 1204
//! selected value = 102
//! ```
//!
//! each terminated by `\r\n` and flushed before returning.

use core::fmt::Write as _;

use embedded_io::Write;
use hal_abstractions::DiagnosticsChannel;
use heapless::String;

/// Longest line is `tried 255, result = -2147483648\r\n`
const LINE_CAPACITY: usize = 40;

/// Channel that ignores every report
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl DiagnosticsChannel for NoDiagnostics {}

/// Channel that writes reports through the crate's logging macros
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticsChannel for LogDiagnostics {
    fn factory_value(&mut self, value: u8) {
        info!("factory value = {}", value);
    }

    fn tried(&mut self, value: u8, error: i32) {
        info!("tried {}, result = {}", value, error);
    }

    fn selected(&mut self, value: u8) {
        info!("selected value = {}", value);
    }
}

/// Line-oriented text channel over a byte-serial port
///
/// A UART clocked from the oscillator under calibration garbles its output
/// while candidates are applied, so the channel reports itself clock
/// sensitive unless told otherwise.
pub struct SerialDiagnostics<W> {
    port: W,
    clock_sensitive: bool,
}

impl<W: Write> SerialDiagnostics<W> {
    pub fn new(port: W) -> Self {
        Self {
            port,
            clock_sensitive: true,
        }
    }

    /// Declare whether the port's bit clock follows the trimmed oscillator.
    pub fn with_clock_sensitivity(mut self, clock_sensitive: bool) -> Self {
        self.clock_sensitive = clock_sensitive;
        self
    }

    pub fn into_inner(self) -> W {
        self.port
    }

    fn write_line(&mut self, args: core::fmt::Arguments<'_>) {
        let mut line: String<LINE_CAPACITY> = String::new();
        if line.write_fmt(args).is_err() || line.push_str("\r\n").is_err() {
            warn!("Diagnostics line does not fit in {} bytes", LINE_CAPACITY);
            return;
        }

        // Reports are best effort; a failing port must not stop calibration
        if self.port.write_all(line.as_bytes()).is_err() || self.port.flush().is_err() {
            warn!("Diagnostics port write failed");
        }
    }
}

impl<W: Write> DiagnosticsChannel for SerialDiagnostics<W> {
    fn clock_sensitive(&self) -> bool {
        self.clock_sensitive
    }

    fn factory_value(&mut self, value: u8) {
        self.write_line(format_args!("factory value = {}", value));
    }

    fn tried(&mut self, value: u8, error: i32) {
        self.write_line(format_args!("tried {}, result = {}", value, error));
    }

    fn selected(&mut self, value: u8) {
        self.write_line(format_args!("selected value = {}", value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct Capture {
        bytes: Vec<u8>,
        flushes: usize,
    }

    impl embedded_io::ErrorType for Capture {
        type Error = Infallible;
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_serial_line_format() {
        let mut channel = SerialDiagnostics::new(Capture::default());
        channel.factory_value(155);
        channel.tried(64, 1204);
        channel.tried(65, -37);
        channel.selected(102);

        let capture = channel.into_inner();
        assert_eq!(
            capture.bytes,
            b"factory value = 155\r\n\
              tried 64, result = 1204\r\n\
              tried 65, result = -37\r\n\
              selected value = 102\r\n"
        );
        assert_eq!(capture.flushes, 4);
    }

    #[test]
    fn test_longest_line_fits() {
        let mut channel = SerialDiagnostics::new(Capture::default());
        channel.tried(255, i32::MIN);
        assert_eq!(
            channel.into_inner().bytes,
            b"tried 255, result = -2147483648\r\n"
        );
    }

    #[test]
    fn test_serial_is_clock_sensitive_by_default() {
        let channel = SerialDiagnostics::new(Capture::default());
        assert!(channel.clock_sensitive());
        let channel = channel.with_clock_sensitivity(false);
        assert!(!channel.clock_sensitive());
        assert!(!LogDiagnostics.clock_sensitive());
    }
}
