//! optimization — generic minimizer and its error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer used to fit kernel-integral matrices:
//! an Argmin-backed minimizer (`objective_optimizer`) and a single
//! error/result surface (`errors::OptError`, `OptResult<T>`). Callers
//! implement an objective, choose a solver and tolerances, and obtain the
//! minimizer and diagnostics without touching backend solver details.
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizers operate in an unconstrained, flat parameter space `θ`;
//!   invalid states are reported as `OptError`, not panics.
//! - Backend errors never escape raw: `From<argmin::core::Error>` maps them,
//!   and objective errors boxed by argmin come back as the original variant.
//!
//! Conventions
//! -----------
//! - Logging is limited to one `tracing::debug!` event with the starting
//!   cost for verbose runs, plus the optional `obs_slog` observer; callers
//!   report results.
//!
//! Downstream usage
//! ----------------
//! - `fitting` implements `Objective` for the moment-matching loss and calls
//!   `minimize`. Front-ends can import everything via
//!   `optimization::prelude::*`.

pub mod errors;
pub mod objective_optimizer;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use hawkes_cumulants::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::objective_optimizer::prelude::*;
}
