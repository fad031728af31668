//! Wait strategies for hardware polls

use core::convert::Infallible;

use hal_abstractions::WaitStrategy;

use crate::error::CalibrationError;

/// Spin until the condition holds, however long that takes.
///
/// A reference source that never runs hangs the calibration forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spin;

impl WaitStrategy for Spin {
    type Error = Infallible;

    fn await_condition<F>(&mut self, mut condition: F) -> Result<(), Infallible>
    where
        F: FnMut() -> bool,
    {
        while !condition() {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

/// Spin for at most `max_polls` evaluations of the condition, then report
/// [`CalibrationError::HardwareDesync`].
#[derive(Debug, Clone, Copy)]
pub struct BoundedSpin {
    max_polls: u32,
}

impl BoundedSpin {
    pub const fn new(max_polls: u32) -> Self {
        Self { max_polls }
    }

    pub const fn max_polls(&self) -> u32 {
        self.max_polls
    }
}

impl WaitStrategy for BoundedSpin {
    type Error = CalibrationError;

    fn await_condition<F>(&mut self, mut condition: F) -> Result<(), CalibrationError>
    where
        F: FnMut() -> bool,
    {
        for _ in 0..self.max_polls {
            if condition() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        error!("Wait gave up after {} polls", self.max_polls);
        Err(CalibrationError::HardwareDesync {
            polls: self.max_polls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_polls_until_true() {
        let mut polls = 0;
        let result = Spin.await_condition(|| {
            polls += 1;
            polls == 5
        });
        assert!(result.is_ok());
        assert_eq!(polls, 5);
    }

    #[test]
    fn test_bounded_spin_succeeds_within_budget() {
        let mut polls = 0;
        let result = BoundedSpin::new(10).await_condition(|| {
            polls += 1;
            polls == 10
        });
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_bounded_spin_times_out() {
        let mut polls = 0;
        let result = BoundedSpin::new(3).await_condition(|| {
            polls += 1;
            false
        });
        assert_eq!(result, Err(CalibrationError::HardwareDesync { polls: 3 }));
        assert_eq!(polls, 3);
    }
}
