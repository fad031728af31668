//! Measurement of a single calibration candidate

use hal_abstractions::{
    CalibratableOscillator, CounterGate, DiagnosticsChannel, ReferenceCounter, SubjectCounter,
    WaitStrategy,
};

use crate::config::CalibrationConfig;
use crate::diagnostics::NoDiagnostics;
use crate::harness::DualCounterHarness;
use crate::oscillator::OscillatorHandle;
use crate::search::Oracle;
use crate::types::{CalibrationValue, MeasurementError};

/// `target - observed`, saturated into [`MeasurementError`].
pub fn measurement_error(target: u32, observed: u64) -> MeasurementError {
    let error = i64::from(target) - observed as i64;
    error.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as MeasurementError
}

/// Applies candidate values to the oscillator and measures their error
/// against the target count.
///
/// Owns the oscillator handle, the counter harness and the diagnostics
/// channel for the duration of the run.
pub struct SampleEvaluator<O, S, R, G, W, D = NoDiagnostics> {
    oscillator: OscillatorHandle<O>,
    harness: DualCounterHarness<S, R, G, W>,
    diagnostics: D,
    diagnostics_enabled: bool,
    target_count: u32,
    factory: CalibrationValue,
}

impl<O, S, R, G, W> SampleEvaluator<O, S, R, G, W, NoDiagnostics>
where
    O: CalibratableOscillator,
    S: SubjectCounter,
    R: ReferenceCounter,
    G: CounterGate,
    W: WaitStrategy,
{
    pub fn new(
        oscillator: O,
        harness: DualCounterHarness<S, R, G, W>,
        config: &CalibrationConfig,
    ) -> Self {
        let oscillator = OscillatorHandle::new(oscillator);
        let factory = oscillator.applied();
        info!(
            "Factory calibration value {}, target count {}",
            factory,
            config.target_count()
        );
        Self {
            oscillator,
            harness,
            diagnostics: NoDiagnostics,
            diagnostics_enabled: config.diagnostics_enabled,
            target_count: config.target_count(),
            factory,
        }
    }
}

impl<O, S, R, G, W, D> SampleEvaluator<O, S, R, G, W, D>
where
    O: CalibratableOscillator,
    S: SubjectCounter,
    R: ReferenceCounter,
    G: CounterGate,
    W: WaitStrategy,
    D: DiagnosticsChannel,
{
    /// Route progress reports to `diagnostics`.
    ///
    /// The factory value is reported right away. Nothing is sent when the
    /// configuration disables diagnostics.
    pub fn with_diagnostics<D2: DiagnosticsChannel>(
        self,
        diagnostics: D2,
    ) -> SampleEvaluator<O, S, R, G, W, D2> {
        let mut evaluator = SampleEvaluator {
            oscillator: self.oscillator,
            harness: self.harness,
            diagnostics,
            diagnostics_enabled: self.diagnostics_enabled,
            target_count: self.target_count,
            factory: self.factory,
        };
        if evaluator.diagnostics_enabled {
            evaluator.diagnostics.factory_value(evaluator.factory);
        }
        evaluator
    }

    /// Apply `candidate` and measure it over one reference cycle.
    ///
    /// The subject counter is left running afterwards.
    pub fn evaluate(&mut self, candidate: CalibrationValue) -> Result<MeasurementError, W::Error> {
        self.oscillator.apply(candidate);

        let reading = self.harness.measure()?;
        let observed = reading.adjusted(S::MODULUS);
        let error = measurement_error(self.target_count, observed);
        trace!("Measured {} counts at {}", observed, candidate);

        if self.diagnostics_enabled {
            self.report_tried(candidate, error);
        }
        Ok(error)
    }

    fn report_tried(&mut self, candidate: CalibrationValue, error: MeasurementError) {
        if !self.diagnostics.clock_sensitive() {
            self.diagnostics.tried(candidate, error);
            return;
        }
        // The channel's bit clock is the oscillator under test; the factory
        // value at least keeps the output readable.
        self.oscillator.apply(self.factory);
        self.diagnostics.tried(candidate, error);
        self.oscillator.apply(candidate);
    }

    /// Report the final value and stop both counters.
    ///
    /// Returns the value left in the calibration register.
    pub fn finish(&mut self) -> CalibrationValue {
        let selected = self.oscillator.applied();
        if self.diagnostics_enabled {
            self.diagnostics.selected(selected);
        }
        self.harness.shutdown();
        selected
    }

    pub fn target_count(&self) -> u32 {
        self.target_count
    }

    /// Register content before the first candidate was applied.
    pub fn factory_value(&self) -> CalibrationValue {
        self.factory
    }

    /// Value currently in the calibration register.
    pub fn applied(&self) -> CalibrationValue {
        self.oscillator.applied()
    }

    pub fn into_parts(self) -> (O, DualCounterHarness<S, R, G, W>, D) {
        (self.oscillator.into_inner(), self.harness, self.diagnostics)
    }
}

impl<O, S, R, G, W, D> Oracle for SampleEvaluator<O, S, R, G, W, D>
where
    O: CalibratableOscillator,
    S: SubjectCounter,
    R: ReferenceCounter,
    G: CounterGate,
    W: WaitStrategy,
    D: DiagnosticsChannel,
{
    type Error = W::Error;

    fn evaluate(&mut self, candidate: CalibrationValue) -> Result<MeasurementError, W::Error> {
        SampleEvaluator::evaluate(self, candidate)
    }

    fn select(&mut self, value: CalibrationValue) {
        self.oscillator.apply(value);
    }
}
