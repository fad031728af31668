//! Dual-counter measurement harness
//!
//! Owns the subject and reference counters for the whole run and provides
//! the one primitive everything else depends on: start both counters on the
//! same edge, let the reference complete one cycle, and read how far the
//! subject counter got.

use critical_section::CriticalSection;
use hal_abstractions::{CounterGate, ReferenceCounter, SubjectCounter, WaitStrategy};

/// Subject counter value at the start of every measurement
pub const SUBJECT_PRESET: u32 = 0;

/// Reference counter value at the start of every measurement
///
/// An overflow flag that lags one reference cycle behind the subject
/// counter is compensated by starting one count ahead. Reference counters
/// without that lag reload at the modulus instead of one below it.
pub const REFERENCE_PRESET: u32 = 1;

/// Raw subject counter value after one reference cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SubjectReading {
    pub count: u32,
    /// Counter wrapped at least once during the measurement window
    pub overflowed: bool,
}

impl SubjectReading {
    /// Observed count with a single wrap folded back in.
    ///
    /// Only one overflow is accounted for. The target must sit below the
    /// counter modulus (see [`CalibrationConfig::target_fits`]) so a second
    /// wrap needs the oscillator to run about twice too fast.
    ///
    /// [`CalibrationConfig::target_fits`]: crate::config::CalibrationConfig::target_fits
    pub const fn adjusted(&self, modulus: u64) -> u64 {
        if self.overflowed {
            self.count as u64 + modulus
        } else {
            self.count as u64
        }
    }
}

/// Subject counter, reference counter and their shared gate, plus the wait
/// strategy used for every hardware poll.
pub struct DualCounterHarness<S, R, G, W> {
    subject: S,
    reference: R,
    gate: G,
    wait: W,
}

impl<S, R, G, W> DualCounterHarness<S, R, G, W>
where
    S: SubjectCounter,
    R: ReferenceCounter,
    G: CounterGate,
    W: WaitStrategy,
{
    pub fn new(subject: S, reference: R, gate: G, wait: W) -> Self {
        Self {
            subject,
            reference,
            gate,
            wait,
        }
    }

    /// Preset both counters and release them on the same edge.
    ///
    /// Requires a critical section: an interrupt that touches either
    /// counter between hold and release biases every later measurement.
    pub fn synchronize_and_start(&mut self, _cs: CriticalSection<'_>) -> Result<(), W::Error> {
        self.gate.hold();

        self.subject.reset(SUBJECT_PRESET);
        self.reference.reset(REFERENCE_PRESET);

        let reference = &self.reference;
        self.wait.await_condition(|| !reference.update_pending())?;

        self.reference.clear_overflow();
        self.subject.clear_overflow();

        self.gate.release();
        Ok(())
    }

    /// Block until the reference counter completes one full cycle.
    pub fn wait_for_reference_overflow(&mut self) -> Result<(), W::Error> {
        let reference = &self.reference;
        self.wait.await_condition(|| reference.overflowed())
    }

    /// Halt the subject counter, read it, and set it running again.
    pub fn stop_subject_and_read(&mut self) -> SubjectReading {
        self.subject.stop();
        let reading = SubjectReading {
            count: self.subject.read(),
            overflowed: self.subject.overflowed(),
        };
        self.subject.start();
        reading
    }

    /// Run one complete measurement cycle with interrupts masked.
    pub fn measure(&mut self) -> Result<SubjectReading, W::Error> {
        critical_section::with(|cs| -> Result<SubjectReading, W::Error> {
            self.synchronize_and_start(cs)?;
            self.wait_for_reference_overflow()?;
            Ok(self.stop_subject_and_read())
        })
    }

    /// Stop both counters once calibration is over.
    pub fn shutdown(&mut self) {
        self.subject.stop();
        self.reference.stop();
    }

    pub fn into_parts(self) -> (S, R, G, W) {
        (self.subject, self.reference, self.gate, self.wait)
    }
}
