//! Fitting driver: estimate `R` from `(L, C, K_c)`.
//!
//! [`fit_kernel_integrals`] validates the moment shapes, builds the starting
//! matrix, and minimizes [`MomentMatchingLoss`] with the configured solver.
//! The defaults reproduce the historical fitting script: `R` starts at all
//! ones, `α = 10`, and ten fixed-step descent iterations with learning rate
//! `1e4`. That step size is tuned to the intensity scale of long
//! high-frequency samples; unit-scale moments need a much smaller rate or
//! L-BFGS.
use ndarray::Array2;
use tracing::info;

use crate::{
    cumulants::engine::MomentSummary,
    fitting::loss::{flatten, unflatten, validate_moments, MomentMatchingLoss, DEFAULT_ALPHA},
    optimization::{
        errors::{OptError, OptResult},
        objective_optimizer::{
            minimize, OptimOutcome, OptimizerOptions, SolverMethod, Theta, Tolerances,
        },
    },
};

/// Default fixed learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 1e4;

/// Default number of descent iterations.
pub const DEFAULT_EPOCHS: usize = 10;

/// Solver choice for a fit.
pub type FitMethod = SolverMethod;

/// Starting point for `R`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FitInit {
    /// Every entry equal to one.
    #[default]
    Ones,
    /// The identity, i.e. the Poisson model.
    Identity,
    /// A caller-supplied `d × d` matrix.
    Matrix(Array2<f64>),
}

impl FitInit {
    /// Flattened starting vector for dimension `dim`.
    ///
    /// # Errors
    /// [`OptError::ThetaLengthMismatch`] when a supplied matrix is not `dim × dim`.
    pub fn theta0(&self, dim: usize) -> OptResult<Theta> {
        match self {
            FitInit::Ones => Ok(Theta::ones(dim * dim)),
            FitInit::Identity => Ok(flatten(Array2::<f64>::eye(dim).view())),
            FitInit::Matrix(m) if m.dim() == (dim, dim) => Ok(flatten(m.view())),
            FitInit::Matrix(m) => {
                Err(OptError::ThetaLengthMismatch { expected: dim * dim, actual: m.len() })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub alpha: f64,
    pub method: FitMethod,
    pub tols: Tolerances,
    pub init: FitInit,
    pub verbose: bool,
}

impl FitOptions {
    /// # Errors
    /// - [`OptError::InvalidMomentWeight`] for an invalid `alpha`.
    /// - Solver validation errors from [`OptimizerOptions::new`].
    pub fn new(
        alpha: f64, method: FitMethod, tols: Tolerances, init: FitInit, verbose: bool,
    ) -> OptResult<Self> {
        MomentMatchingLoss::new(alpha)?;
        OptimizerOptions::new(tols, method, verbose)?;
        Ok(Self { alpha, method, tols, init, verbose })
    }

    pub fn with_init(mut self, init: FitInit) -> Self {
        self.init = init;
        self
    }

    fn optimizer_options(&self) -> OptResult<OptimizerOptions> {
        OptimizerOptions::new(self.tols, self.method, self.verbose)
    }
}

/// Reference-script defaults. On unit-scale moments the `1e4` step
/// diverges and [`fit_kernel_integrals`] returns an error.
impl Default for FitOptions {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            method: SolverMethod::GradientDescent { learning_rate: DEFAULT_LEARNING_RATE },
            tols: Tolerances { tol_grad: None, tol_cost: None, max_iter: Some(DEFAULT_EPOCHS) },
            init: FitInit::Ones,
            verbose: false,
        }
    }
}

/// Estimated kernel-integral matrix and the optimizer diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelFit {
    pub r_hat: Array2<f64>,
    pub outcome: OptimOutcome,
}

impl KernelFit {
    /// Final moment-matching loss.
    pub fn loss(&self) -> f64 {
        self.outcome.value
    }
}

/// Fit `R` to the moments.
///
/// # Errors
/// - [`OptError::MomentShapeMismatch`] when `C` or `K_c` is not `d × d`.
/// - [`OptError::ThetaLengthMismatch`] for a mis-shaped starting matrix.
/// - Option validation and solver errors from [`minimize`], including
///   [`OptError::NonFiniteCost`] when the iterates diverge.
pub fn fit_kernel_integrals(
    moments: &MomentSummary, options: &FitOptions,
) -> OptResult<KernelFit> {
    let loss = MomentMatchingLoss::new(options.alpha)?;
    validate_moments(moments)?;
    let dim = moments.intensities.len();
    let theta0 = options.init.theta0(dim)?;
    let opts = options.optimizer_options()?;

    let outcome = minimize(&loss, theta0, moments, &opts)?;
    let r_hat = unflatten(&outcome.theta_hat, dim)?;
    info!(
        dim,
        iterations = outcome.iterations,
        loss = outcome.value,
        status = %outcome.status,
        "kernel-integral fit finished"
    );
    Ok(KernelFit { r_hat, outcome })
}
