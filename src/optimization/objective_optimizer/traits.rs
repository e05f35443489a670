//! Public API surface for objective minimization.
//!
//! - [`Objective`]: trait users implement for the quantity being minimized.
//! - [`OptimizerOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`SolverMethod`]: fixed-step gradient descent or L-BFGS.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`OptimOutcome`]: normalized result returned by [`minimize`](super::minimize).
//!
//! Convention: the optimizer *minimizes* the user objective `c(θ)` directly.
//! If an analytic gradient is provided, it is the gradient of that same
//! objective (`∇c(θ)`).
use crate::optimization::{
    errors::{OptError, OptResult},
    objective_optimizer::{
        types::{Cost, FnEvalMap, Grad, Theta},
        validation::{
            validate_theta_hat, validate_value, verify_learning_rate, verify_tol_cost,
            verify_tol_grad,
        },
    },
};
use argmin::core::TerminationStatus;
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// User-implemented objective interface.
///
/// - `type Data`: per-objective data carried into `value`/`grad`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `c(θ)`.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before optimization.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient `∇c(θ)`.
///   If not implemented, finite differences are used automatically.
pub trait Objective {
    type Data: 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing accepts case-insensitive `"MoreThuente"` and `"HagerZhang"`;
/// unknown names return `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Solver used by [`minimize`](super::minimize).
///
/// - `GradientDescent { learning_rate }`: `θ ← θ − η·∇c(θ)` every iteration,
///   with no line search.
/// - `Lbfgs { line_searcher, mem }`: L-BFGS with the given line search and
///   history size (`None` uses [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM)).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverMethod {
    GradientDescent { learning_rate: f64 },
    Lbfgs { line_searcher: LineSearcher, mem: Option<usize> },
}

impl SolverMethod {
    /// Validated fixed-step gradient descent.
    ///
    /// # Errors
    /// [`OptError::InvalidLearningRate`] for a non-finite or non-positive rate.
    pub fn gradient_descent(learning_rate: f64) -> OptResult<Self> {
        verify_learning_rate(learning_rate)?;
        Ok(SolverMethod::GradientDescent { learning_rate })
    }

    /// Validated L-BFGS configuration.
    ///
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] when `mem == Some(0)`.
    pub fn lbfgs(line_searcher: LineSearcher, mem: Option<usize>) -> OptResult<Self> {
        let method = SolverMethod::Lbfgs { line_searcher, mem };
        method.validate()?;
        Ok(method)
    }

    fn validate(&self) -> OptResult<()> {
        match *self {
            SolverMethod::GradientDescent { learning_rate } => verify_learning_rate(learning_rate),
            SolverMethod::Lbfgs { mem: Some(0), .. } => Err(OptError::InvalidLBFGSMem {
                mem: 0,
                reason: "L-BFGS memory must be greater than zero.",
            }),
            SolverMethod::Lbfgs { .. } => Ok(()),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — numerical tolerances and iteration limits.
/// - `method: SolverMethod` — solver and its settings.
/// - `verbose: bool` — if `true`, attaches an observer (behind the `obs_slog`
///   feature) and prints progress.
///
/// Default:
/// - `tols`: `tol_grad = 1e-6`, `tol_cost = None`, `max_iter = 300`
/// - `method`: L-BFGS with More–Thuente and the default memory
/// - `verbose`: `false`
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerOptions {
    pub tols: Tolerances,
    pub method: SolverMethod,
    pub verbose: bool,
}

impl OptimizerOptions {
    /// Create a new set of optimizer options.
    ///
    /// # Errors
    /// - [`OptError::InvalidLearningRate`] for an invalid descent step.
    /// - [`OptError::InvalidLBFGSMem`] for a zero L-BFGS memory.
    pub fn new(tols: Tolerances, method: SolverMethod, verbose: bool) -> OptResult<Self> {
        method.validate()?;
        Ok(Self { tols, method, verbose })
    }
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: None, max_iter: Some(300) },
            method: SolverMethod::Lbfgs { line_searcher: LineSearcher::MoreThuente, mem: None },
            verbose: false,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold.
/// - `tol_cost`: terminate when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** of the three must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best objective value `c(θ̂)`.
/// - `converged`: `true` if the solver reported a terminating status other
///   than `NotTerminated` (reaching `max_iter` counts as terminated).
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
/// - `grad_norm`: norm of the last available gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, converged: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match converged {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            other => (true, format!("{other:?}")),
        };
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals, grad_norm })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argmin::core::TerminationReason;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Parsing of line-search names.
    // - Validation in `Tolerances::new`, `SolverMethod` and
    //   `OptimizerOptions::new`.
    // - Mapping of termination status and gradient norm in `OptimOutcome`.
    // -------------------------------------------------------------------------

    #[test]
    fn line_searcher_parses_case_insensitively() {
        assert_eq!("hagerzhang".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert_eq!("MORETHUENTE".parse::<LineSearcher>(), Ok(LineSearcher::MoreThuente));
        assert!(matches!(
            "newton".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Configuration constructors reject unusable settings.
    //
    // Given
    // -----
    // - All-`None` tolerances, `max_iter = 0`, zero learning rate, zero memory.
    //
    // Expect
    // ------
    // - The dedicated error variant for each case.
    fn configuration_constructors_validate_inputs() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { max_iter: 0, .. })
        ));
        assert!(matches!(
            SolverMethod::gradient_descent(0.0),
            Err(OptError::InvalidLearningRate { .. })
        ));
        assert!(matches!(
            SolverMethod::lbfgs(LineSearcher::HagerZhang, Some(0)),
            Err(OptError::InvalidLBFGSMem { mem: 0, .. })
        ));

        let tols = Tolerances::new(None, None, Some(10)).unwrap();
        let literal = SolverMethod::GradientDescent { learning_rate: f64::NAN };
        assert!(OptimizerOptions::new(tols, literal, false).is_err());
    }

    #[test]
    // Purpose
    // -------
    // `OptimOutcome::new` maps the termination status and the gradient norm.
    //
    // Given
    // -----
    // - A converged status with gradient `[3, 4]`, and a not-terminated one.
    //
    // Expect
    // ------
    // - `converged = true`, `grad_norm = 5`; then `converged = false`.
    fn outcome_maps_status_and_gradient_norm() {
        let done = OptimOutcome::new(
            Some(array![1.0, 2.0]),
            0.5,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            4,
            FnEvalMap::new(),
            Some(array![3.0, 4.0]),
        )
        .unwrap();
        let running = OptimOutcome::new(
            Some(array![1.0]),
            0.5,
            TerminationStatus::NotTerminated,
            1,
            FnEvalMap::new(),
            None,
        )
        .unwrap();

        assert!(done.converged);
        assert_eq!(done.iterations, 4);
        assert!((done.grad_norm.unwrap() - 5.0).abs() < 1e-12);
        assert!(!running.converged);
        assert_eq!(running.status, "Not terminated");
    }
}
