//! Value types shared by the calibration engine

/// Content of the oscillator's 8-bit calibration register.
pub type CalibrationValue = u8;

/// Target count minus observed count.
///
/// Positive means the oscillator runs too slow and the calibration value
/// should go up; negative means it runs too fast.
pub type MeasurementError = i32;

/// Start point of a search over one contiguous calibration range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SearchRange {
    /// First value evaluated.
    pub center: CalibrationValue,
    /// Initial step; a power of two.
    pub step: u8,
}

impl SearchRange {
    /// Lower half of a split register (high bit clear).
    pub const LOW: Self = Self::new(64, 32);
    /// Upper half of a split register (high bit set).
    pub const HIGH: Self = Self::new(192, 32);
    /// Whole register on devices with a single contiguous range.
    pub const FULL: Self = Self::new(128, 64);

    /// Create a range start point.
    ///
    /// # Panics
    /// If `step` is not a power of two.
    pub const fn new(center: CalibrationValue, step: u8) -> Self {
        assert!(step.is_power_of_two(), "search step must be a power of two");
        Self { center, step }
    }

    /// Number of evaluations performed by the binary phase: `log2(step)`.
    pub const fn binary_steps(&self) -> u32 {
        self.step.trailing_zeros()
    }
}

static DUAL_RANGES: [SearchRange; 2] = [SearchRange::LOW, SearchRange::HIGH];

/// How the calibration register's value space is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeLayout {
    /// Two overlapping ranges selected by the high bit, searched low then
    /// high.
    #[default]
    Dual,
    /// One contiguous range.
    Single(SearchRange),
}

impl RangeLayout {
    /// Ranges in the order they are searched. Never empty.
    pub fn ranges(&self) -> &[SearchRange] {
        match self {
            Self::Dual => &DUAL_RANGES,
            Self::Single(range) => core::slice::from_ref(range),
        }
    }
}

/// Best value found by a search and its absolute error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationResult {
    pub value: CalibrationValue,
    /// `|MeasurementError|` of `value`.
    pub error: u32,
}

impl CalibrationResult {
    pub const fn new(value: CalibrationValue, error: MeasurementError) -> Self {
        Self {
            value,
            error: error.unsigned_abs(),
        }
    }

    /// Whether the value hit the target count exactly.
    pub const fn is_exact(&self) -> bool {
        self.error == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_steps() {
        assert_eq!(SearchRange::LOW.binary_steps(), 5);
        assert_eq!(SearchRange::FULL.binary_steps(), 6);
        assert_eq!(SearchRange::new(16, 8).binary_steps(), 3);
        assert_eq!(SearchRange::new(16, 1).binary_steps(), 0);
    }

    #[test]
    #[should_panic]
    fn test_non_power_of_two_step_rejected() {
        let step = 24;
        let _ = SearchRange::new(64, step);
    }

    #[test]
    fn test_layout_ranges() {
        assert_eq!(
            RangeLayout::Dual.ranges(),
            &[SearchRange::LOW, SearchRange::HIGH]
        );
        assert_eq!(
            RangeLayout::Single(SearchRange::FULL).ranges(),
            &[SearchRange::FULL]
        );
    }

    #[test]
    fn test_result_stores_magnitude() {
        let result = CalibrationResult::new(70, -12);
        assert_eq!(result.error, 12);
        assert!(!result.is_exact());
        assert!(CalibrationResult::new(70, 0).is_exact());
    }
}
