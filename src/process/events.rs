//! Event sequences and the multi-dimensional process collection.
//!
//! Purpose
//! -------
//! Hold the observed point-process realisation that every cumulant statistic
//! scans: one sorted array of event timestamps per dimension, the common
//! observation horizon `T`, and the average intensity vector `L`.
//!
//! Key behaviors
//! -------------
//! - [`EventSequence`] validates that timestamps are finite and
//!   non-decreasing; [`EventSequence::from_unsorted`] sorts first.
//! - [`ProcessCollection`] derives `T` as the largest `last − first` span over
//!   the non-empty sequences and `L_i = n_i / T`, recomputing both whenever the
//!   sequences are reassigned.
//! - Degenerate but valid inputs (an empty dimension, a zero horizon) are
//!   reported by [`ProcessCollection::degeneracies`] and logged as warnings;
//!   they never fail construction.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every stored sequence is sorted ascending and finite.
//! - `intensities().len() == dim()` at all times.
//! - When `horizon() == 0.0`, every intensity is exactly `0.0`.
//!
//! Conventions
//! -----------
//! - Timestamps are absolute; windowed statistics skip anchors whose window
//!   would start before time zero, so sequences are expected to start near 0.
//!
//! Testing notes
//! -------------
//! - Unit tests cover validation failures, sorting, horizon/intensity
//!   derivation, and degenerate-input reporting.
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::process::errors::{ProcessError, ProcessResult};

/// Sorted timestamps of one marginal point process.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSequence {
    times: Vec<f64>,
}

impl EventSequence {
    /// Validate already-sorted timestamps.
    ///
    /// # Errors
    /// - [`ProcessError::NonFiniteTimestamp`] for the first NaN/±inf entry.
    /// - [`ProcessError::UnsortedTimestamps`] for the first entry smaller than
    ///   its predecessor.
    pub fn new(times: Vec<f64>) -> ProcessResult<Self> {
        for (index, &value) in times.iter().enumerate() {
            if !value.is_finite() {
                return Err(ProcessError::NonFiniteTimestamp { index, value });
            }
            if index > 0 && value < times[index - 1] {
                return Err(ProcessError::UnsortedTimestamps {
                    index,
                    previous: times[index - 1],
                    value,
                });
            }
        }
        Ok(Self { times })
    }

    /// Sort the timestamps ascending, then validate them.
    ///
    /// # Errors
    /// - [`ProcessError::NonFiniteTimestamp`] if any entry is NaN/±inf.
    pub fn from_unsorted(mut times: Vec<f64>) -> ProcessResult<Self> {
        if let Some((index, &value)) = times.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ProcessError::NonFiniteTimestamp { index, value });
        }
        times.sort_by(f64::total_cmp);
        Ok(Self { times })
    }

    /// An empty (zero-intensity) sequence.
    pub fn empty() -> Self {
        Self { times: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.times.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// `last − first`, or `None` for an empty sequence.
    pub fn span(&self) -> Option<f64> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some(last - first),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.times
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.times
    }
}

/// Non-fatal input conditions that make downstream statistics uninformative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateInput {
    /// Dimension `dim` has no events; its intensity is zero.
    EmptyDimension { dim: usize },
    /// Every sequence has zero span; `T` and all intensities are zero.
    ZeroHorizon,
}

impl std::fmt::Display for DegenerateInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegenerateInput::EmptyDimension { dim } => {
                write!(f, "Dimension {dim} has no events; its intensity is zero")
            }
            DegenerateInput::ZeroHorizon => {
                write!(f, "Observation horizon is zero; all intensities are zero")
            }
        }
    }
}

/// `d` event sequences sharing one observation horizon.
///
/// Fields
/// ------
/// - `sequences`: one [`EventSequence`] per dimension.
/// - `horizon`: `T = max_i (last_i − first_i)` over non-empty sequences.
/// - `intensities`: `L_i = n_i / T` (all zero when `T == 0`).
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessCollection {
    sequences: Vec<EventSequence>,
    horizon: f64,
    intensities: Array1<f64>,
}

impl ProcessCollection {
    /// Build the collection and derive `T` and `L`.
    ///
    /// Degenerate inputs are logged at `warn` level and remain queryable via
    /// [`ProcessCollection::degeneracies`].
    pub fn new(sequences: Vec<EventSequence>) -> Self {
        let (horizon, intensities) = derive_intensities(&sequences);
        let collection = Self { sequences, horizon, intensities };
        collection.log_degeneracies();
        collection
    }

    /// Validate raw, already-sorted timestamp vectors and build the collection.
    ///
    /// # Errors
    /// Propagates the first [`ProcessError`] from [`EventSequence::new`].
    pub fn from_vecs(raw: Vec<Vec<f64>>) -> ProcessResult<Self> {
        let sequences = raw.into_iter().map(EventSequence::new).collect::<ProcessResult<_>>()?;
        Ok(Self::new(sequences))
    }

    /// Replace the sequences and recompute `T` and `L`.
    pub fn set_sequences(&mut self, sequences: Vec<EventSequence>) {
        let (horizon, intensities) = derive_intensities(&sequences);
        self.sequences = sequences;
        self.horizon = horizon;
        self.intensities = intensities;
        self.log_degeneracies();
    }

    pub fn dim(&self) -> usize {
        self.sequences.len()
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    pub fn intensities(&self) -> &Array1<f64> {
        &self.intensities
    }

    pub fn sequences(&self) -> &[EventSequence] {
        &self.sequences
    }

    /// Timestamps of dimension `dim`.
    ///
    /// # Errors
    /// [`ProcessError::DimensionOutOfRange`] when `dim >= self.dim()`.
    pub fn sequence(&self, dim: usize) -> ProcessResult<&EventSequence> {
        self.sequences
            .get(dim)
            .ok_or(ProcessError::DimensionOutOfRange { dim, len: self.sequences.len() })
    }

    /// Every non-fatal degenerate condition of the current input.
    pub fn degeneracies(&self) -> Vec<DegenerateInput> {
        let mut found: Vec<DegenerateInput> = self
            .sequences
            .iter()
            .enumerate()
            .filter(|(_, seq)| seq.is_empty())
            .map(|(dim, _)| DegenerateInput::EmptyDimension { dim })
            .collect();
        if self.horizon == 0.0 && !self.sequences.is_empty() {
            found.push(DegenerateInput::ZeroHorizon);
        }
        found
    }

    fn log_degeneracies(&self) {
        for issue in self.degeneracies() {
            warn!(dim = self.dim(), horizon = self.horizon, "degenerate input: {issue}");
        }
    }
}

fn derive_intensities(sequences: &[EventSequence]) -> (f64, Array1<f64>) {
    let horizon = sequences.iter().filter_map(EventSequence::span).fold(0.0_f64, f64::max);
    let intensities = if horizon > 0.0 {
        Array1::from_iter(sequences.iter().map(|seq| seq.len() as f64 / horizon))
    } else {
        Array1::zeros(sequences.len())
    };
    (horizon, intensities)
}
