//! Simulated chip for host tests
//!
//! Every capability trait is implemented over one shared [`SimChip`]. The
//! oscillator's behaviour is a plain response function mapping a
//! calibration value to the subject count accumulated during one reference
//! cycle. Releasing the gate completes that cycle immediately, so waits
//! resolve on the first poll.

#![allow(dead_code)]

use core::cell::{Cell, RefCell};
use core::convert::Infallible;

use hal_abstractions::{
    CalibratableOscillator, CounterGate, DiagnosticsChannel, PersistenceSink, ReferenceCounter,
    SubjectCounter,
};

use crate::config::CalibrationConfig;
use crate::evaluator::SampleEvaluator;
use crate::harness::DualCounterHarness;
use crate::search::Oracle;
use crate::types::{CalibrationValue, MeasurementError};
use crate::wait::Spin;

pub const SUBJECT_MODULUS: u64 = 65_536;

/// Hardware side effects, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Apply(u8),
    Hold,
    Release,
    SubjectReset(u32),
    SubjectClearOverflow,
    SubjectStop,
    SubjectStart,
    ReferenceReset(u32),
    ReferenceClearOverflow,
    ReferenceStop,
}

pub struct SimChip {
    response: fn(CalibrationValue) -> u64,
    osccal: Cell<u8>,
    subject_count: Cell<u64>,
    subject_overflow: Cell<bool>,
    reference_overflow: Cell<bool>,
    reference_dead: bool,
    update_latency: u32,
    pending_polls: Cell<u32>,
    update_polls: Cell<u32>,
    events: RefCell<Vec<Event>>,
}

impl SimChip {
    pub fn new(response: fn(CalibrationValue) -> u64) -> Self {
        Self {
            response,
            osccal: Cell::new(0x80),
            subject_count: Cell::new(0),
            subject_overflow: Cell::new(false),
            reference_overflow: Cell::new(false),
            reference_dead: false,
            update_latency: 0,
            pending_polls: Cell::new(0),
            update_polls: Cell::new(0),
            events: RefCell::new(Vec::new()),
        }
    }

    /// Register content before calibration starts.
    pub fn with_factory_value(self, value: u8) -> Self {
        self.osccal.set(value);
        self
    }

    /// Reference counter writes stay pending for `polls` polls.
    pub fn with_update_latency(mut self, polls: u32) -> Self {
        self.update_latency = polls;
        self
    }

    /// Reference counter never overflows.
    pub fn with_dead_reference(mut self) -> Self {
        self.reference_dead = true;
        self
    }

    pub fn oscillator(&self) -> SimOscillator<'_> {
        SimOscillator(self)
    }

    pub fn subject(&self) -> SimSubject<'_> {
        SimSubject(self)
    }

    pub fn reference(&self) -> SimReference<'_> {
        SimReference(self)
    }

    pub fn gate(&self) -> SimGate<'_> {
        SimGate(self)
    }

    pub fn harness(&self) -> DualCounterHarness<SimSubject<'_>, SimReference<'_>, SimGate<'_>, Spin> {
        DualCounterHarness::new(self.subject(), self.reference(), self.gate(), Spin)
    }

    pub fn evaluator(
        &self,
        config: &CalibrationConfig,
    ) -> SampleEvaluator<SimOscillator<'_>, SimSubject<'_>, SimReference<'_>, SimGate<'_>, Spin>
    {
        SampleEvaluator::new(self.oscillator(), self.harness(), config)
    }

    pub fn osccal(&self) -> u8 {
        self.osccal.get()
    }

    pub fn update_polls(&self) -> u32 {
        self.update_polls.get()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Values written to the calibration register, in order.
    pub fn applied(&self) -> Vec<u8> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Apply(value) => Some(*value),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    /// One full reference cycle at the current calibration value.
    fn run_reference_cycle(&self) {
        if self.reference_dead {
            return;
        }
        let count = self.subject_count.get() + (self.response)(self.osccal.get());
        self.subject_count.set(count);
        if count >= SUBJECT_MODULUS {
            self.subject_overflow.set(true);
        }
        self.reference_overflow.set(true);
    }
}

pub struct SimOscillator<'a>(&'a SimChip);

impl CalibratableOscillator for SimOscillator<'_> {
    fn current(&self) -> u8 {
        self.0.osccal.get()
    }

    fn apply(&mut self, value: u8) {
        self.0.osccal.set(value);
        self.0.record(Event::Apply(value));
    }
}

pub struct SimSubject<'a>(&'a SimChip);

impl SubjectCounter for SimSubject<'_> {
    const MODULUS: u64 = SUBJECT_MODULUS;

    fn reset(&mut self, count: u32) {
        self.0.subject_count.set(u64::from(count));
        self.0.record(Event::SubjectReset(count));
    }

    fn start(&mut self) {
        self.0.record(Event::SubjectStart);
    }

    fn stop(&mut self) {
        self.0.record(Event::SubjectStop);
    }

    fn read(&self) -> u32 {
        (self.0.subject_count.get() % SUBJECT_MODULUS) as u32
    }

    fn overflowed(&self) -> bool {
        self.0.subject_overflow.get()
    }

    fn clear_overflow(&mut self) {
        self.0.subject_overflow.set(false);
        self.0.record(Event::SubjectClearOverflow);
    }
}

pub struct SimReference<'a>(&'a SimChip);

impl ReferenceCounter for SimReference<'_> {
    fn reset(&mut self, count: u32) {
        self.0.pending_polls.set(self.0.update_latency);
        self.0.record(Event::ReferenceReset(count));
    }

    fn update_pending(&self) -> bool {
        self.0.update_polls.set(self.0.update_polls.get() + 1);
        let pending = self.0.pending_polls.get();
        if pending > 0 {
            self.0.pending_polls.set(pending - 1);
            true
        } else {
            false
        }
    }

    fn overflowed(&self) -> bool {
        self.0.reference_overflow.get()
    }

    fn clear_overflow(&mut self) {
        self.0.reference_overflow.set(false);
        self.0.record(Event::ReferenceClearOverflow);
    }

    fn stop(&mut self) {
        self.0.record(Event::ReferenceStop);
    }
}

pub struct SimGate<'a>(&'a SimChip);

impl CounterGate for SimGate<'_> {
    fn hold(&mut self) {
        self.0.record(Event::Hold);
    }

    fn release(&mut self) {
        self.0.record(Event::Release);
        self.0.run_reference_cycle();
    }
}

/// Diagnostics report as seen by the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Factory(u8),
    /// `osccal` is the register content while the line was written
    Tried { value: u8, error: i32, osccal: u8 },
    Selected(u8),
}

pub struct RecordingDiagnostics<'a> {
    chip: &'a SimChip,
    clock_sensitive: bool,
    pub reports: Vec<Report>,
}

impl<'a> RecordingDiagnostics<'a> {
    pub fn new(chip: &'a SimChip, clock_sensitive: bool) -> Self {
        Self {
            chip,
            clock_sensitive,
            reports: Vec::new(),
        }
    }
}

impl DiagnosticsChannel for RecordingDiagnostics<'_> {
    fn clock_sensitive(&self) -> bool {
        self.clock_sensitive
    }

    fn factory_value(&mut self, value: u8) {
        self.reports.push(Report::Factory(value));
    }

    fn tried(&mut self, value: u8, error: i32) {
        self.reports.push(Report::Tried {
            value,
            error,
            osccal: self.chip.osccal(),
        });
    }

    fn selected(&mut self, value: u8) {
        self.reports.push(Report::Selected(value));
    }
}

/// Byte store with update semantics: unchanged values are not rewritten.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub byte: Option<u8>,
    pub writes: u32,
}

impl PersistenceSink for MemorySink {
    fn store(&mut self, value: u8) {
        if self.byte != Some(value) {
            self.byte = Some(value);
            self.writes += 1;
        }
    }
}

/// Oracle backed by a pure error function
pub struct FnOracle {
    error: fn(CalibrationValue) -> MeasurementError,
    pub evaluated: Vec<u8>,
    pub selected: Vec<u8>,
}

impl FnOracle {
    pub fn new(error: fn(CalibrationValue) -> MeasurementError) -> Self {
        Self {
            error,
            evaluated: Vec::new(),
            selected: Vec::new(),
        }
    }
}

impl Oracle for FnOracle {
    type Error = Infallible;

    fn evaluate(&mut self, candidate: CalibrationValue) -> Result<MeasurementError, Infallible> {
        self.evaluated.push(candidate);
        Ok((self.error)(candidate))
    }

    fn select(&mut self, value: CalibrationValue) {
        self.selected.push(value);
    }
}
