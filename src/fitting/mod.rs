//! fitting — estimate the kernel-integral matrix from integrated cumulants.
//!
//! Purpose
//! -------
//! Close the loop from the empirical moments `(L, C, K_c)` produced by
//! [`crate::cumulants::Cumulants::moments`] to an estimate `R̂` of the
//! kernel-integral matrix `R = (I − G)⁻¹`, by minimizing a weighted
//! squared mismatch between the empirical cumulants and their theoretical
//! values at `R`.
//!
//! Key behaviors
//! -------------
//! - [`MomentMatchingLoss`]: `mean((A3 − K_c)²) + α·mean((A2 − C)²)` over the
//!   row-major flattened `R`, with an analytic gradient.
//! - [`fit_kernel_integrals`]: shape validation, starting point, solver
//!   dispatch through [`crate::optimization::objective_optimizer::minimize`],
//!   and a [`KernelFit`] with `R̂` and the optimizer outcome.
//!
//! Invariants & assumptions
//! ------------------------
//! - `C` and `K_c` are `d × d` for `d = L.len()`; violations are
//!   [`OptError::MomentShapeMismatch`](crate::optimization::errors::OptError::MomentShapeMismatch).
//! - The loss is non-convex in `R`; the result depends on the starting point.
//!
//! Conventions
//! -----------
//! - Defaults follow the historical script: all-ones start, `α = 10`, ten
//!   fixed-step descent iterations at learning rate `1e4`.
//! - Errors share the optimizer surface (`OptError`, `OptResult`).
//!
//! Testing notes
//! -------------
//! - Unit tests check the loss against hand values, the gradient against
//!   finite differences, and recovery of `R` from exact moments.

pub mod driver;
pub mod loss;

pub use self::driver::{fit_kernel_integrals, FitInit, FitMethod, FitOptions, KernelFit};
pub use self::loss::MomentMatchingLoss;
pub use crate::cumulants::engine::MomentSummary;

pub mod prelude {
    pub use super::driver::{
        fit_kernel_integrals, FitInit, FitMethod, FitOptions, KernelFit, DEFAULT_EPOCHS,
        DEFAULT_LEARNING_RATE,
    };
    pub use super::loss::{MomentMatchingLoss, DEFAULT_ALPHA};
    pub use crate::cumulants::engine::MomentSummary;
}
