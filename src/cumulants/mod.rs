//! cumulants — windowed estimators and the integrated-cumulant session.
//!
//! Purpose
//! -------
//! Turn a [`ProcessCollection`](crate::process::ProcessCollection) into the
//! integrated cumulants of orders 1–3 used to estimate a Hawkes
//! kernel-integral matrix: the covariance `C`, the lag intensity `J`, the
//! third-moment tensor `E_c`, and the contracted third cumulant `K_c`, plus
//! their theoretical counterparts for a known `R`.
//!
//! Key behaviors
//! -------------
//! - [`kernels`]: `O(n)` two-pointer scans `A_ij`, `E_ijk`, `I_ij` over sorted
//!   timestamps.
//! - [`strategy`]: sequential or rayon-parallel evaluation of a per-pair
//!   statistic over the `d × d` index space.
//! - [`engine`]: the [`Cumulants`] session with one operation per stage and
//!   the `compute_all` pipeline `C → E_c → J → K_c (→ C_th → K_c_th)`.
//! - [`theory`]: `C_th = R·diag(L)·Rᵀ` and `K_c_th`.
//! - [`bandwidth`], [`weighting`], [`bundle`]: bandwidth heuristics, GMM
//!   weighting matrices over a sample log, and JSON persistence.
//!
//! Invariants & assumptions
//! ------------------------
//! - Stages are pure given the sequences, `L`, `T` and the bandwidth.
//! - Dependent stages fail with [`CumulantError::MissingPrerequisite`] rather
//!   than computing from absent inputs.
//! - The parallel strategy is a scatter/gather over independent pairs; it
//!   shares no mutable state and returns bit-identical arrays.
//!
//! Conventions
//! -----------
//! - Arrays follow the estimator literature names in docs and error messages
//!   (`C`, `J`, `E_c`, `K_c`, `F_c`, `H`, `C_th`, `K_c_th`, `W_2`, `W_3`) and
//!   descriptive names in code.
//! - Kernel-integral matrices may be supplied flattened row-major or as
//!   `d × d` matrices ([`KernelIntegrals`]).
//!
//! Downstream usage
//! ----------------
//! - Build a [`Cumulants`] session, call [`Cumulants::compute_all`], then pass
//!   [`Cumulants::moments`] to [`crate::fitting::fit_kernel_integrals`].
//!
//! Testing notes
//! -------------
//! - Every submodule has unit tests; kernel property tests against nested
//!   loops and statistical end-to-end checks live under `tests/`.

pub mod bandwidth;
pub mod bundle;
pub mod engine;
pub mod errors;
pub mod kernels;
pub mod options;
pub mod progress;
pub mod strategy;
pub mod theory;
pub mod weighting;

pub use self::bandwidth::BandwidthRule;
pub use self::bundle::CumulantBundle;
pub use self::engine::{Cumulants, MomentSummary};
pub use self::errors::{CumulantError, CumulantResult};
pub use self::options::{CumulantOptions, ExecutionStrategy, ThirdCumulantFormula, TrendConvention};
pub use self::progress::{ProgressSink, Stage};
pub use self::theory::KernelIntegrals;
pub use self::weighting::{SampleLog, WeightingAccumulation};

pub mod prelude {
    pub use super::bandwidth::BandwidthRule;
    pub use super::bundle::CumulantBundle;
    pub use super::engine::{Cumulants, MomentSummary};
    pub use super::errors::{CumulantError, CumulantResult};
    pub use super::kernels::{lag_integral, window_count, window_product, Marginal};
    pub use super::options::{
        CumulantOptions, ExecutionStrategy, ThirdCumulantFormula, TrendConvention,
    };
    pub use super::progress::{
        ProgressSink, RecordingProgress, SilentProgress, Stage, TracingProgress,
    };
    pub use super::theory::{theoretical_covariance, theoretical_third_cumulant, KernelIntegrals};
    pub use super::weighting::{SampleLog, WeightingAccumulation};
}
