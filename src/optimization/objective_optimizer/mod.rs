//! objective_optimizer — argmin-powered minimizer for smooth objectives.
//!
//! Purpose
//! -------
//! Provide a small, Argmin-backed optimization layer for **minimizing**
//! objectives `c(θ)` from Rust or Python. Callers implement a single trait,
//! [`Objective`], and invoke [`minimize`] to run either fixed-step gradient
//! descent or L-BFGS with a configurable line search.
//!
//! Key behaviors
//! -------------
//! - Convert user objectives into Argmin problems via
//!   [`adapter::ArgMinAdapter`], with a finite-difference gradient fallback.
//! - [`descent::FixedStepDescent`] implements `θ ← θ − η·∇c(θ)` as an Argmin
//!   `Solver`, so it shares the executor, observers and counters with L-BFGS.
//! - [`minimize`] validates the initial guess with [`Objective::check`],
//!   builds the solver chosen by [`SolverMethod`] via [`builders`], runs it
//!   via [`run::run_solver`], and normalizes results into an [`OptimOutcome`].
//!
//! Invariants & assumptions
//! ------------------------
//! - [`Objective::value`] and [`Objective::grad`] treat invalid inputs as
//!   recoverable [`OptError`](crate::optimization::errors::OptError) values,
//!   not panics.
//! - Configuration types ([`Tolerances`], [`SolverMethod`],
//!   [`OptimizerOptions`]) are validated on construction.
//!
//! Conventions
//! -----------
//! - The cost is the objective itself; gradients are `∇c(θ)`.
//! - [`OptimOutcome::value`] is the best objective value reached.
//! - Reaching `max_iter` reports `converged = true` with a `MaxItersReached`
//!   status; fixed-iteration descent relies on this.
//!
//! Downstream usage
//! ----------------
//! - [`crate::fitting`] implements [`Objective`] for the moment-matching
//!   loss and calls [`minimize`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover adapter pass-through and FD fallback, exact descent
//!   iterates, builder wiring, option validation, and convergence of every
//!   solver on toy quadratics.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod descent;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::descent::FixedStepDescent;
pub use self::traits::{
    LineSearcher, Objective, OptimOutcome, OptimizerOptions, SolverMethod, Tolerances,
};
pub use self::types::{Cost, FnEvalMap, Grad, Theta, DEFAULT_LBFGS_MEM};

pub mod prelude {
    pub use super::api::minimize;
    pub use super::traits::{
        LineSearcher, Objective, OptimOutcome, OptimizerOptions, SolverMethod, Tolerances,
    };
    pub use super::types::{Cost, Grad, Theta};
}
