//! Binary search with neighbour refinement over one calibration range
//!
//! Raising the calibration value usually raises the frequency, but some
//! single-step increments lower it slightly. Steps of two always raise it.
//! The binary phase therefore stops one step early, so every center it
//! visits is an even distance from the previous one. The three values left
//! around the final center may be out of order and are all tried.

use crate::types::{CalibrationResult, CalibrationValue, MeasurementError, SearchRange};

/// Source of measurement errors for the search.
pub trait Oracle {
    type Error;

    /// Apply `candidate` and return its signed error.
    fn evaluate(&mut self, candidate: CalibrationValue) -> Result<MeasurementError, Self::Error>;

    /// Leave `value` applied as the current hardware state.
    fn select(&mut self, value: CalibrationValue);
}

impl<T: Oracle + ?Sized> Oracle for &mut T {
    type Error = T::Error;

    fn evaluate(&mut self, candidate: CalibrationValue) -> Result<MeasurementError, T::Error> {
        (**self).evaluate(candidate)
    }

    fn select(&mut self, value: CalibrationValue) {
        (**self).select(value)
    }
}

/// Position of the binary phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SearchState {
    pub center: CalibrationValue,
    pub step: u8,
}

impl SearchState {
    pub const fn new(range: SearchRange) -> Self {
        Self {
            center: range.center,
            step: range.step,
        }
    }

    /// The binary phase runs while the step is larger than one.
    pub const fn is_searching(&self) -> bool {
        self.step > 1
    }

    /// Move towards the target and halve the step.
    ///
    /// A positive error means the oscillator is too slow.
    pub fn advance(&mut self, error: MeasurementError) {
        self.center = if error > 0 {
            self.center.wrapping_add(self.step)
        } else {
            self.center.wrapping_sub(self.step)
        };
        self.step >>= 1;
    }
}

/// Searches one contiguous range through an [`Oracle`].
pub struct RangeSearcher<'a, E: ?Sized> {
    oracle: &'a mut E,
}

impl<'a, E: Oracle + ?Sized> RangeSearcher<'a, E> {
    pub fn new(oracle: &'a mut E) -> Self {
        Self { oracle }
    }

    /// Find the value with the smallest absolute error in `range`.
    ///
    /// An exact match during the binary phase returns immediately.
    /// Otherwise the winner of the neighbour refinement is selected on the
    /// oracle before returning.
    pub fn search(&mut self, range: SearchRange) -> Result<CalibrationResult, E::Error> {
        debug!("Searching from {} with step {}", range.center, range.step);

        let mut state = SearchState::new(range);
        while state.is_searching() {
            let error = self.oracle.evaluate(state.center)?;
            if error == 0 {
                debug!("Exact match at {}", state.center);
                return Ok(CalibrationResult::new(state.center, 0));
            }
            state.advance(error);
        }

        self.refine(state.center)
    }

    /// Try `center`, `center + 1` and `center - 1`; the first of equally
    /// good values wins, so a tie always keeps `center`.
    fn refine(&mut self, center: CalibrationValue) -> Result<CalibrationResult, E::Error> {
        let mut best = CalibrationResult::new(center, self.oracle.evaluate(center)?);

        for value in [center.wrapping_add(1), center.wrapping_sub(1)] {
            let candidate = CalibrationResult::new(value, self.oracle.evaluate(value)?);
            if candidate.error < best.error {
                best = candidate;
            }
        }

        self.oracle.select(best.value);
        debug!("Best of {} neighbours: {} (|error| {})", center, best.value, best.error);
        Ok(best)
    }
}
