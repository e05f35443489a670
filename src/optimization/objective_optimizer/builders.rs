//! Solver builders.
//!
//! Each builder turns [`OptimizerOptions`] into a ready-to-run argmin solver
//! with the configured tolerances applied:
//!
//! - [`build_optimizer_hager_zhang`] / [`build_optimizer_more_thuente`]:
//!   L-BFGS with the respective line search and history size.
//! - [`build_fixed_step_descent`]: constant-step gradient descent.
//!
//! Tolerances that are `None` are left at the solver defaults.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    objective_optimizer::{
        descent::FixedStepDescent,
        traits::OptimizerOptions,
        types::{
            Cost, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente, MoreThuenteLS, Theta,
            DEFAULT_LBFGS_MEM,
        },
    },
};

/// L-BFGS with the Hager–Zhang line search.
///
/// # Errors
/// Propagates tolerance rejections from argmin via [`configure_lbfgs`].
pub fn build_optimizer_hager_zhang(
    opts: &OptimizerOptions, mem: Option<usize>,
) -> OptResult<LbfgsHagerZhang> {
    let solver = LBFGS::new(HagerZhangLS::new(), mem.unwrap_or(DEFAULT_LBFGS_MEM));
    configure_lbfgs(solver, opts)
}

/// L-BFGS with the More–Thuente line search.
///
/// # Errors
/// Propagates tolerance rejections from argmin via [`configure_lbfgs`].
pub fn build_optimizer_more_thuente(
    opts: &OptimizerOptions, mem: Option<usize>,
) -> OptResult<LbfgsMoreThuente> {
    let solver = LBFGS::new(MoreThuenteLS::new(), mem.unwrap_or(DEFAULT_LBFGS_MEM));
    configure_lbfgs(solver, opts)
}

/// Apply the gradient and cost tolerances of `opts` to an L-BFGS solver,
/// whatever its line search.
///
/// # Errors
/// `OptError` (via `From<argmin::core::Error>`) when argmin rejects a
/// tolerance.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &OptimizerOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

/// Fixed-step descent carrying the tolerances of `opts`.
///
/// # Errors
/// [`OptError::InvalidLearningRate`](crate::optimization::errors::OptError::InvalidLearningRate)
/// for an invalid rate.
pub fn build_fixed_step_descent(
    learning_rate: f64, opts: &OptimizerOptions,
) -> OptResult<FixedStepDescent> {
    let mut solver = FixedStepDescent::new(learning_rate)?;
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g);
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c);
    }
    Ok(solver)
}
