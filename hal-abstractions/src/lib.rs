//! Hardware abstraction traits for oscillator calibration firmware
//!
//! This crate defines the capabilities the calibration engine needs from a
//! board: two counters, a shared start gate, the oscillator's calibration
//! register, a single-byte persistent store, an optional diagnostics line
//! channel and a busy-wait strategy. BSPs implement these traits; host tests
//! implement them over a simulated chip.

#![no_std]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod counter;
pub mod diagnostics;
pub mod oscillator;
pub mod storage;
pub mod wait;

pub use counter::{CounterGate, ReferenceCounter, SubjectCounter};
pub use diagnostics::DiagnosticsChannel;
pub use oscillator::CalibratableOscillator;
pub use storage::PersistenceSink;
pub use wait::WaitStrategy;
