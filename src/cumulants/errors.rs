//! Errors for the cumulant engine (stage ordering, configuration of the
//! weighting routines, shape checks, and bundle persistence).
//!
//! [`CumulantError`] is the single error surface of the `cumulants` area.
//! Every variant is a caller contract violation; nothing here is transient
//! and nothing is retried.
//!
//! ## Taxonomy
//! - **Precondition** — [`CumulantError::MissingPrerequisite`],
//!   [`CumulantError::MissingGroundTruth`]: a dependent stage was requested
//!   before the arrays it consumes exist.
//! - **Configuration** — [`CumulantError::EmptySampleLog`],
//!   [`CumulantError::SampleLogLengthMismatch`]: the accumulated per-sample
//!   lists cannot be combined into a weighting matrix.
//! - **Shape / value** — bandwidths, kernel-integral shapes, dimension
//!   mismatches, grid sizes.
//! - **Persistence** — JSON and filesystem failures for the cumulant bundle.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, PyErr};

use crate::{cumulants::progress::Stage, process::errors::ProcessError};

/// Result alias for cumulant operations that may produce [`CumulantError`].
pub type CumulantResult<T> = Result<T, CumulantError>;

/// Unified error type for the cumulant engine.
#[derive(Debug, Clone, PartialEq)]
pub enum CumulantError {
    // ---- Preconditions ----
    /// `requested` needs `missing`, which has not been computed yet.
    MissingPrerequisite { requested: Stage, missing: Stage },

    /// A theoretical cumulant was requested without a ground-truth `R`.
    MissingGroundTruth { requested: Stage },

    // ---- Configuration ----
    /// The sample log holds no samples for the named list.
    EmptySampleLog { list: &'static str },

    /// The per-sample lists do not have equal lengths.
    SampleLogLengthMismatch { intensities: usize, covariances: usize, third_cumulants: usize },

    // ---- Shape / value checks ----
    /// Bandwidth must be finite and strictly positive.
    InvalidBandwidth { value: f64, reason: &'static str },

    /// Bandwidth grid needs at least one point.
    InvalidGridSize { size: usize },

    /// Kernel-integral input has neither `d²` entries nor shape `d × d`.
    KernelIntegralShape { dim: usize, found: Vec<usize> },

    /// An array does not match the process dimension.
    DimensionMismatch { what: &'static str, expected: Vec<usize>, found: Vec<usize> },

    /// Invalid event data surfaced while building or restoring a session.
    InvalidProcess { text: String },

    /// Unknown execution strategy name.
    UnknownStrategy { name: String },

    // ---- Persistence ----
    /// JSON encoding/decoding of the cumulant bundle failed.
    Serialization { text: String },

    /// Reading or writing the cumulant bundle failed.
    Io { text: String },
}

impl std::error::Error for CumulantError {}

impl std::fmt::Display for CumulantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Preconditions ----
            CumulantError::MissingPrerequisite { requested, missing } => {
                write!(f, "Cannot compute {requested}: {missing} has not been computed yet")
            }
            CumulantError::MissingGroundTruth { requested } => {
                write!(f, "Cannot compute {requested}: no ground-truth kernel integrals were set")
            }
            // ---- Configuration ----
            CumulantError::EmptySampleLog { list } => {
                write!(f, "Sample log list '{list}' is empty; push samples first")
            }
            CumulantError::SampleLogLengthMismatch {
                intensities,
                covariances,
                third_cumulants,
            } => {
                write!(
                    f,
                    "Sample log lists must have equal lengths: L has {intensities}, C has {covariances}, K_c has {third_cumulants}"
                )
            }
            // ---- Shape / value checks ----
            CumulantError::InvalidBandwidth { value, reason } => {
                write!(f, "Invalid bandwidth {value}: {reason}")
            }
            CumulantError::InvalidGridSize { size } => {
                write!(f, "Bandwidth grid size must be positive; got {size}")
            }
            CumulantError::KernelIntegralShape { dim, found } => {
                write!(
                    f,
                    "Kernel integrals must have {} entries or shape ({dim}, {dim}); found shape {found:?}",
                    dim * dim
                )
            }
            CumulantError::DimensionMismatch { what, expected, found } => {
                write!(f, "{what} has shape {found:?}; expected {expected:?}")
            }
            CumulantError::InvalidProcess { text } => {
                write!(f, "Invalid event data: {text}")
            }
            CumulantError::UnknownStrategy { name } => {
                write!(
                    f,
                    "Unknown execution strategy '{name}'; valid options are 'sequential', 'classic' or 'parallel'"
                )
            }
            // ---- Persistence ----
            CumulantError::Serialization { text } => {
                write!(f, "Cumulant bundle serialization failed: {text}")
            }
            CumulantError::Io { text } => {
                write!(f, "Cumulant bundle I/O failed: {text}")
            }
        }
    }
}

impl From<ProcessError> for CumulantError {
    fn from(err: ProcessError) -> Self {
        CumulantError::InvalidProcess { text: err.to_string() }
    }
}

impl From<serde_json::Error> for CumulantError {
    fn from(err: serde_json::Error) -> Self {
        CumulantError::Serialization { text: err.to_string() }
    }
}

impl From<std::io::Error> for CumulantError {
    fn from(err: std::io::Error) -> Self {
        CumulantError::Io { text: err.to_string() }
    }
}

/// Convert a [`CumulantError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl From<CumulantError> for PyErr {
    fn from(err: CumulantError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
