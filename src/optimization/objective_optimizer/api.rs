//! High-level entry point for minimizing a user-provided `Objective`.
//!
//! Dispatches on [`SolverMethod`]: fixed-step descent, or L-BFGS with the
//! Hager–Zhang or More–Thuente line search, then delegates the run to
//! [`run_solver`].
use crate::optimization::{
    errors::OptResult,
    objective_optimizer::{
        adapter::ArgMinAdapter,
        builders::{
            build_fixed_step_descent, build_optimizer_hager_zhang, build_optimizer_more_thuente,
        },
        run::run_solver,
        traits::{LineSearcher, Objective, OptimOutcome, OptimizerOptions, SolverMethod},
        types::Theta,
    },
};

/// Minimize an objective `c(θ)` with the solver chosen in `opts.method`.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Wraps `(f, data)` in an [`ArgMinAdapter`].
/// - Builds the solver and calls [`run_solver`], which configures the
///   executor (initial params, max iters, optional observer).
///
/// # Errors
/// - Propagates any error from `f.check`.
/// - Propagates builder errors.
/// - Propagates runtime errors (objective failures, line-search failures).
///
/// # Example
/// ```
/// use ndarray::array;
/// use hawkes_cumulants::optimization::errors::OptResult;
/// use hawkes_cumulants::optimization::objective_optimizer::{
///     minimize, Objective, OptimizerOptions, Theta,
/// };
///
/// struct Bowl;
/// impl Objective for Bowl {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         Ok(theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = minimize(&Bowl, array![0.1, -0.2, 0.3], &(), &OptimizerOptions::default())?;
/// assert!(out.value < 1e-8);
/// # Ok::<(), hawkes_cumulants::optimization::errors::OptError>(())
/// ```
pub fn minimize<F: Objective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &OptimizerOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.method {
        SolverMethod::GradientDescent { learning_rate } => {
            let solver = build_fixed_step_descent(learning_rate, opts)?;
            run_solver(theta0, opts, problem, solver)
        }
        SolverMethod::Lbfgs { line_searcher: LineSearcher::MoreThuente, mem } => {
            let solver = build_optimizer_more_thuente(opts, mem)?;
            run_solver(theta0, opts, problem, solver)
        }
        SolverMethod::Lbfgs { line_searcher: LineSearcher::HagerZhang, mem } => {
            let solver = build_optimizer_hager_zhang(opts, mem)?;
            run_solver(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptError,
        objective_optimizer::{
            traits::Tolerances,
            types::{Cost, Grad},
        },
    };
    use ndarray::{array, Array1};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `minimize` with every solver choice on a shifted quadratic.
    // - The FD fallback when no analytic gradient exists.
    // - Rejection by the `check` hook before any solver runs.
    // -------------------------------------------------------------------------

    /// `c(θ) = Σ (θ_k − target_k)²`.
    struct Shifted {
        analytic: bool,
    }

    impl Objective for Shifted {
        type Data = Array1<f64>;

        fn value(&self, theta: &Theta, target: &Array1<f64>) -> OptResult<Cost> {
            let diff = theta - target;
            Ok(diff.dot(&diff))
        }

        fn check(&self, theta: &Theta, target: &Array1<f64>) -> OptResult<()> {
            if theta.len() != target.len() {
                return Err(OptError::ThetaLengthMismatch {
                    expected: target.len(),
                    actual: theta.len(),
                });
            }
            Ok(())
        }

        fn grad(&self, theta: &Theta, target: &Array1<f64>) -> OptResult<Grad> {
            if !self.analytic {
                return Err(OptError::GradientNotImplemented);
            }
            Ok((theta - target) * 2.0)
        }
    }

    #[test]
    // Purpose
    // -------
    // Every solver reaches the minimum of a convex quadratic.
    //
    // Given
    // -----
    // - Target `[1, -2, 0.5]`, start at zero.
    // - Descent with `η = 0.25` for 60 iterations; both L-BFGS variants.
    //
    // Expect
    // ------
    // - `theta_hat` within `1e-6` of the target for each solver.
    fn minimize_converges_with_every_solver() {
        let target = array![1.0, -2.0, 0.5];
        let tols = Tolerances::new(Some(1e-10), None, Some(60)).unwrap();
        let methods = [
            SolverMethod::gradient_descent(0.25).unwrap(),
            SolverMethod::lbfgs(LineSearcher::MoreThuente, None).unwrap(),
            SolverMethod::lbfgs(LineSearcher::HagerZhang, Some(5)).unwrap(),
        ];

        for method in methods {
            let opts = OptimizerOptions::new(tols, method, false).unwrap();
            let out = minimize(&Shifted { analytic: true }, Array1::zeros(3), &target, &opts)
                .unwrap();

            for (a, b) in out.theta_hat.iter().zip(target.iter()) {
                assert!((a - b).abs() < 1e-6, "{method:?} ended at {:?}", out.theta_hat);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Finite differences stand in for a missing gradient.
    //
    // Given
    // -----
    // - The same quadratic without an analytic gradient; L-BFGS.
    //
    // Expect
    // ------
    // - Convergence to the target within `1e-5`.
    fn minimize_uses_finite_differences_without_gradient() {
        let target = array![0.3, 0.7];
        let opts = OptimizerOptions::default();

        let out = minimize(&Shifted { analytic: false }, Array1::zeros(2), &target, &opts).unwrap();

        for (a, b) in out.theta_hat.iter().zip(target.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn minimize_runs_check_hook_first() {
        let err = minimize(
            &Shifted { analytic: true },
            Array1::zeros(1),
            &array![1.0, 2.0],
            &OptimizerOptions::default(),
        )
        .unwrap_err();

        assert_eq!(err, OptError::ThetaLengthMismatch { expected: 2, actual: 1 });
    }
}
