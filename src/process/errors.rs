//! Errors for event-sequence construction and process collections.
//!
//! [`ProcessError`] covers the only ways raw timestamps can be rejected at the
//! boundary: non-finite values, decreasing values, and dimension lookups that
//! fall outside the collection. Degenerate but valid inputs (empty
//! dimensions, zero horizon) are **not** errors; see
//! [`crate::process::events::DegenerateInput`].
//!
//! ## Conventions
//! - **Indices are 0-based**, both for dimensions and for positions inside a
//!   sequence.
//! - Timestamps must be finite and non-decreasing once validated.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, PyErr};

/// Result alias for process construction paths that may produce
/// [`ProcessError`].
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Validation failures for event sequences and collections.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessError {
    /// A timestamp is NaN/±inf.
    NonFiniteTimestamp { index: usize, value: f64 },

    /// A timestamp is strictly smaller than its predecessor.
    UnsortedTimestamps { index: usize, previous: f64, value: f64 },

    /// Requested dimension does not exist in the collection.
    DimensionOutOfRange { dim: usize, len: usize },
}

impl std::error::Error for ProcessError {}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessError::NonFiniteTimestamp { index, value } => {
                write!(f, "Timestamp at index {index} is non-finite: {value}")
            }
            ProcessError::UnsortedTimestamps { index, previous, value } => {
                write!(
                    f,
                    "Timestamps must be non-decreasing; index {index} holds {value} after {previous}"
                )
            }
            ProcessError::DimensionOutOfRange { dim, len } => {
                write!(f, "Dimension {dim} is out of range for a collection of {len} sequences")
            }
        }
    }
}

/// Convert a [`ProcessError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl From<ProcessError> for PyErr {
    fn from(err: ProcessError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
