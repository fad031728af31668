//! Run-once calibration procedure
//!
//! Calibrate, report, stop the counters, persist. The caller idles
//! afterwards; nothing here is ever repeated.

use hal_abstractions::{
    CalibratableOscillator, CounterGate, DiagnosticsChannel, PersistenceSink, ReferenceCounter,
    SubjectCounter, WaitStrategy,
};

use crate::calibrator::DualRangeCalibrator;
use crate::evaluator::SampleEvaluator;
use crate::types::{CalibrationValue, RangeLayout};

/// Calibrate over `layout` and store the selected value in `sink`.
///
/// The selected value is left applied to the oscillator and both counters
/// are stopped before the value is persisted.
pub fn run_calibration<O, S, R, G, W, D, P>(
    evaluator: SampleEvaluator<O, S, R, G, W, D>,
    layout: RangeLayout,
    sink: &mut P,
) -> Result<CalibrationValue, W::Error>
where
    O: CalibratableOscillator,
    S: SubjectCounter,
    R: ReferenceCounter,
    G: CounterGate,
    W: WaitStrategy,
    D: DiagnosticsChannel,
    P: PersistenceSink + ?Sized,
{
    let mut calibrator = DualRangeCalibrator::new(evaluator, layout);
    let result = calibrator.search_ranges()?;

    let mut evaluator = calibrator.into_oracle();
    let selected = evaluator.finish();
    debug_assert_eq!(selected, result.value);

    sink.store(selected);
    info!(
        "Calibration value {} stored (factory {}, |error| {})",
        selected,
        evaluator.factory_value(),
        result.error
    );
    Ok(selected)
}
