//! Moment-matching loss over a flattened kernel-integral matrix.
//!
//! For a candidate `R` (flattened row-major into `θ`, length `d²`) and the
//! empirical moments `(L, C, K_c)`:
//!
//! - `A2 = R·diag(L)·Rᵀ`
//! - `A3 = (R∘R)·Cᵀ + 2·(R∘C)·Rᵀ − 2·(R∘R)·diag(L)·Rᵀ`
//! - `loss = mean((A3 − K_c)²) + α·mean((A2 − C)²)`
//!
//! `A2` and `A3` are the theoretical maps of [`crate::cumulants::theory`]
//! evaluated at the iterate. The analytic gradient, with `D = diag(L)`,
//! `S = R∘R`, `G3 = 2(A3 − K_c)/d²` and `G2 = 2α(A2 − C)/d²`, is
//!
//! ```text
//! ∇ = (G2 + G2ᵀ)·R·D + 2·R∘(G3·C) + 2·C∘(G3·R) + 2·G3ᵀ·(R∘C)
//!     − 4·R∘(G3·R·D) − 2·G3ᵀ·S·D
//! ```
use ndarray::{Array1, Array2, ArrayView2};

use crate::{
    cumulants::{
        engine::MomentSummary,
        theory::{covariance_map, third_cumulant_map},
    },
    optimization::{
        errors::{OptError, OptResult},
        objective_optimizer::{Cost, Grad, Objective, Theta},
    },
};

/// Default weight of the second-order term.
pub const DEFAULT_ALPHA: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentMatchingLoss {
    alpha: f64,
}

impl MomentMatchingLoss {
    /// # Errors
    /// [`OptError::InvalidMomentWeight`] when `alpha` is negative or not finite.
    pub fn new(alpha: f64) -> OptResult<Self> {
        if !alpha.is_finite() {
            return Err(OptError::InvalidMomentWeight { alpha, reason: "Weight must be finite." });
        }
        if alpha < 0.0 {
            return Err(OptError::InvalidMomentWeight {
                alpha,
                reason: "Weight must be non-negative.",
            });
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Third- and second-order residuals `(A3 − K_c, A2 − C)` at `r`.
    pub fn residuals(
        &self, r: ArrayView2<'_, f64>, moments: &MomentSummary,
    ) -> (Array2<f64>, Array2<f64>) {
        let l = moments.intensities.view();
        let c = moments.covariance.view();
        let third = third_cumulant_map(l, c, r) - &moments.third_cumulant;
        let second = covariance_map(l, r) - &moments.covariance;
        (third, second)
    }
}

impl Default for MomentMatchingLoss {
    fn default() -> Self {
        Self { alpha: DEFAULT_ALPHA }
    }
}

impl Objective for MomentMatchingLoss {
    type Data = MomentSummary;

    fn value(&self, theta: &Theta, moments: &MomentSummary) -> OptResult<Cost> {
        validate_moments(moments)?;
        let dim = moments.intensities.len();
        if dim == 0 {
            return Ok(0.0);
        }
        let r = unflatten(theta, dim)?;
        let (third, second) = self.residuals(r.view(), moments);
        let n = (dim * dim) as f64;
        Ok(third.mapv(|x| x * x).sum() / n + self.alpha * second.mapv(|x| x * x).sum() / n)
    }

    fn check(&self, theta: &Theta, moments: &MomentSummary) -> OptResult<()> {
        validate_moments(moments)?;
        let dim = moments.intensities.len();
        if theta.len() != dim * dim {
            return Err(OptError::ThetaLengthMismatch { expected: dim * dim, actual: theta.len() });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value });
        }
        Ok(())
    }

    fn grad(&self, theta: &Theta, moments: &MomentSummary) -> OptResult<Grad> {
        validate_moments(moments)?;
        let dim = moments.intensities.len();
        if dim == 0 {
            return Ok(Grad::zeros(0));
        }
        let r = unflatten(theta, dim)?;
        let (third, second) = self.residuals(r.view(), moments);
        let n = (dim * dim) as f64;
        let l = &moments.intensities;
        let c = &moments.covariance;

        let g3 = third * (2.0 / n);
        let g2 = second * (2.0 * self.alpha / n);
        let rd = &r * l;
        let sd = &(&r * &r) * l;

        let mut grad = (&g2 + &g2.t()).dot(&rd);
        grad.scaled_add(2.0, &(&r * &g3.dot(c)));
        grad.scaled_add(2.0, &(c * &g3.dot(&r)));
        grad.scaled_add(2.0, &g3.t().dot(&(&r * c)));
        grad.scaled_add(-4.0, &(&r * &g3.dot(&rd)));
        grad.scaled_add(-2.0, &g3.t().dot(&sd));
        Ok(grad.iter().copied().collect())
    }
}

/// Row-major `d × d` view of a flattened parameter vector.
///
/// # Errors
/// [`OptError::ThetaLengthMismatch`] when `theta.len() != dim²`.
pub fn unflatten(theta: &Theta, dim: usize) -> OptResult<Array2<f64>> {
    if theta.len() != dim * dim {
        return Err(OptError::ThetaLengthMismatch { expected: dim * dim, actual: theta.len() });
    }
    Ok(Array2::from_shape_fn((dim, dim), |(i, j)| theta[i * dim + j]))
}

/// Row-major flattening of a matrix.
pub fn flatten(r: ArrayView2<'_, f64>) -> Theta {
    r.iter().copied().collect::<Array1<f64>>()
}

/// `C` and `K_c` must be `d × d` for `d = L.len()`.
///
/// # Errors
/// [`OptError::MomentShapeMismatch`] naming the offending array.
pub fn validate_moments(moments: &MomentSummary) -> OptResult<()> {
    let dim = moments.intensities.len();
    for (what, m) in
        [("covariance", &moments.covariance), ("third_cumulant", &moments.third_cumulant)]
    {
        if m.dim() != (dim, dim) {
            return Err(OptError::MomentShapeMismatch {
                what,
                expected: vec![dim, dim],
                found: m.shape().to_vec(),
            });
        }
    }
    Ok(())
}
