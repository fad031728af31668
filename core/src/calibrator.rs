//! Search across every calibration range of the register
//!
//! Some oscillators split the calibration register into two overlapping
//! ranges selected by its high bit. Each range is searched on its own and
//! the better result is kept.

use crate::search::{Oracle, RangeSearcher};
use crate::types::{CalibrationResult, CalibrationValue, RangeLayout, SearchRange};

pub struct DualRangeCalibrator<E> {
    oracle: E,
    layout: RangeLayout,
}

impl<E: Oracle> DualRangeCalibrator<E> {
    pub fn new(oracle: E, layout: RangeLayout) -> Self {
        Self { oracle, layout }
    }

    /// Search every range and leave the best value applied.
    ///
    /// On equal errors the later range wins.
    pub fn search_ranges(&mut self) -> Result<CalibrationResult, E::Error> {
        let layout = self.layout;
        let ranges = layout.ranges();

        let mut last = self.search_range(ranges[0])?;
        let mut best = last;
        for range in &ranges[1..] {
            last = self.search_range(*range)?;
            if last.error <= best.error {
                best = last;
            }
        }

        // The last range searched left its own winner applied
        if best.value != last.value {
            self.oracle.select(best.value);
        }
        info!("Selected {} (|error| {})", best.value, best.error);
        Ok(best)
    }

    /// Run the calibration and return the value left applied.
    pub fn calibrate(&mut self) -> Result<CalibrationValue, E::Error> {
        self.search_ranges().map(|result| result.value)
    }

    fn search_range(&mut self, range: SearchRange) -> Result<CalibrationResult, E::Error> {
        let result = RangeSearcher::new(&mut self.oracle).search(range)?;
        info!(
            "Range at {}: best {} (|error| {})",
            range.center, result.value, result.error
        );
        Ok(result)
    }

    pub fn layout(&self) -> RangeLayout {
        self.layout
    }

    pub fn into_oracle(self) -> E {
        self.oracle
    }
}
