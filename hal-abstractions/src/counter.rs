//! Counter capabilities used by the dual-counter measurement harness
//!
//! A measurement runs two free-running counters side by side: the *subject*
//! counter, clocked by the oscillator being calibrated, and the *reference*
//! counter, clocked by an accurate external source. The [`CounterGate`]
//! holds both in reset so they can be released on the same clock edge.

/// Counter clocked by the oscillator under calibration.
pub trait SubjectCounter {
    /// Number of counts after which the counter wraps to zero.
    ///
    /// A 16-bit timer has a modulus of 65536.
    const MODULUS: u64;

    /// Preset the counter value. Only called while the gate is held.
    fn reset(&mut self, count: u32);

    /// Let the counter run.
    fn start(&mut self);

    /// Halt the counter so its value can be read consistently.
    fn stop(&mut self);

    /// Raw counter value.
    fn read(&self) -> u32;

    /// Whether the counter wrapped at least once since the flag was cleared.
    fn overflowed(&self) -> bool;

    /// Clear the overflow indicator.
    fn clear_overflow(&mut self);
}

/// Counter clocked by the accurate reference source.
pub trait ReferenceCounter {
    /// Preset the counter value. Only called while the gate is held.
    fn reset(&mut self, count: u32);

    /// `true` while a write to the counter has not yet reached the counter's
    /// own clock domain.
    ///
    /// Counters on the bus clock never have a pending update and can keep
    /// the default.
    fn update_pending(&self) -> bool {
        false
    }

    /// Whether the counter completed a full cycle since the flag was cleared.
    fn overflowed(&self) -> bool;

    /// Clear the overflow indicator.
    fn clear_overflow(&mut self);

    /// Stop the counter for good once calibration is finished.
    fn stop(&mut self);
}

/// Shared lock that holds both counters and releases them simultaneously.
pub trait CounterGate {
    /// Hold both counters in reset.
    fn hold(&mut self);

    /// Release both counters so they start counting on the same edge.
    fn release(&mut self);
}

impl<T: SubjectCounter + ?Sized> SubjectCounter for &mut T {
    const MODULUS: u64 = T::MODULUS;

    fn reset(&mut self, count: u32) {
        (**self).reset(count)
    }

    fn start(&mut self) {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn read(&self) -> u32 {
        (**self).read()
    }

    fn overflowed(&self) -> bool {
        (**self).overflowed()
    }

    fn clear_overflow(&mut self) {
        (**self).clear_overflow()
    }
}

impl<T: ReferenceCounter + ?Sized> ReferenceCounter for &mut T {
    fn reset(&mut self, count: u32) {
        (**self).reset(count)
    }

    fn update_pending(&self) -> bool {
        (**self).update_pending()
    }

    fn overflowed(&self) -> bool {
        (**self).overflowed()
    }

    fn clear_overflow(&mut self) {
        (**self).clear_overflow()
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

impl<T: CounterGate + ?Sized> CounterGate for &mut T {
    fn hold(&mut self) {
        (**self).hold()
    }

    fn release(&mut self) {
        (**self).release()
    }
}
