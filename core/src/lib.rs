//! Platform-agnostic oscillator calibration engine
//!
//! This crate finds the calibration register value that brings an internal
//! RC oscillator closest to a target frequency, measured against a crystal
//! driven reference counter. It has NO hardware dependencies: boards supply
//! the counters, the register and the storage through the traits in
//! `hal-abstractions`.
//!
//! ## Layers
//! - [`harness`]: starts both counters on the same edge and reads them back
//! - [`evaluator`]: applies one candidate and returns its signed error
//! - [`search`]: binary search plus neighbour refinement over one range
//! - [`calibrator`]: searches every range of the register, keeps the best
//! - [`procedure`]: the run-once sequence ending in persistent storage
//!
//! ## Usage
//! ```ignore
//! let harness = DualCounterHarness::new(subject, reference, gate, Spin);
//! let evaluator = SampleEvaluator::new(oscillator, harness, &CONFIG)
//!     .with_diagnostics(LogDiagnostics);
//! let value = run_calibration(evaluator, CONFIG.layout, &mut storage)?;
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod calibrator;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod harness;
pub mod oscillator;
pub mod procedure;
pub mod search;
pub mod types;
pub mod wait;

#[cfg(test)]
mod sim;

pub use hal_abstractions as hal;

pub use calibrator::DualRangeCalibrator;
pub use config::{target_count, CalibrationConfig};
pub use diagnostics::{LogDiagnostics, NoDiagnostics, SerialDiagnostics};
pub use error::CalibrationError;
pub use evaluator::SampleEvaluator;
pub use harness::{DualCounterHarness, SubjectReading};
pub use oscillator::OscillatorHandle;
pub use procedure::run_calibration;
pub use search::{Oracle, RangeSearcher, SearchState};
pub use types::{CalibrationResult, CalibrationValue, MeasurementError, RangeLayout, SearchRange};
pub use wait::{BoundedSpin, Spin};
