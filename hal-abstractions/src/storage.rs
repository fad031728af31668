//! Persistent storage for the selected calibration value

/// Durable single-byte store at a fixed address.
///
/// The store is assumed synchronous and reliable; there is no failure
/// signaling. Writing the value that is already stored must have no further
/// effect.
pub trait PersistenceSink {
    /// Persist `value`.
    fn store(&mut self, value: u8);
}

impl<T: PersistenceSink + ?Sized> PersistenceSink for &mut T {
    fn store(&mut self, value: u8) {
        (**self).store(value)
    }
}
