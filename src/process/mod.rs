//! process — observed event sequences, horizon, and intensities.
//!
//! Purpose
//! -------
//! Provide the validated input layer of the cumulant stack: per-dimension
//! sorted timestamp arrays bundled into a [`ProcessCollection`] that owns the
//! shared observation horizon `T` and the average intensity vector `L`.
//!
//! Key behaviors
//! -------------
//! - Validate raw timestamps ([`EventSequence::new`]) or sort them first
//!   ([`EventSequence::from_unsorted`]).
//! - Derive `T = max_i (last_i − first_i)` and `L_i = n_i / T`.
//! - Report empty dimensions and zero horizons as [`DegenerateInput`]
//!   warnings rather than errors.
//!
//! Invariants & assumptions
//! ------------------------
//! - Stored sequences are finite and non-decreasing.
//! - A zero horizon maps every intensity to exactly zero, so downstream
//!   statistics stay finite.
//!
//! Downstream usage
//! ----------------
//! - The cumulant engine borrows sequences as `&[f64]` slices and never
//!   mutates them; parallel evaluation relies on this.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to the types in [`events`].

pub mod errors;
pub mod events;

pub use self::errors::{ProcessError, ProcessResult};
pub use self::events::{DegenerateInput, EventSequence, ProcessCollection};

pub mod prelude {
    pub use super::errors::{ProcessError, ProcessResult};
    pub use super::events::{DegenerateInput, EventSequence, ProcessCollection};
}
