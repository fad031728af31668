//! Busy-wait abstraction for hardware polls

/// Strategy used to wait until a hardware condition holds.
///
/// Production strategies spin on the predicate. Test strategies can resolve
/// immediately from simulated state, and a hardened strategy may give up
/// after a bounded number of polls and report `Self::Error`.
pub trait WaitStrategy {
    /// Error reported when the strategy gives up waiting.
    type Error;

    /// Poll `condition` until it returns `true`.
    fn await_condition<F>(&mut self, condition: F) -> Result<(), Self::Error>
    where
        F: FnMut() -> bool;
}

impl<T: WaitStrategy + ?Sized> WaitStrategy for &mut T {
    type Error = T::Error;

    fn await_condition<F>(&mut self, condition: F) -> Result<(), Self::Error>
    where
        F: FnMut() -> bool,
    {
        (**self).await_condition(condition)
    }
}
