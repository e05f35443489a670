//! Per-sample cumulant log and GMM weighting matrices.
//!
//! Purpose
//! -------
//! When several independent realisations of the same process are available,
//! the spread of the empirical cumulants around their model-implied values
//! gives element-wise weights for a generalized-method-of-moments objective.
//! [`SampleLog`] records the `(L, C, K_c)` triple of each realisation in
//! order; [`second_order_weighting`] and [`third_order_weighting`] reduce the
//! log to `d × d` weighting matrices for a candidate kernel-integral matrix.
//!
//! Key behaviors
//! -------------
//! - `W_2 = (1/n) Σ_s (R·diag(L_s)·Rᵀ − C_s)²` (element-wise square).
//! - `W_3` uses the residual
//!   `(R∘R)·C_sᵀ + 2·(R∘C_s)·Rᵀ − 2·(R∘R)·(diag(L_s)·Rᵀ) − K_c,s`, squared.
//!   [`WeightingAccumulation::LastSample`] keeps only the last sample's
//!   squared residual before dividing by `n`, matching the historical
//!   estimator output; [`WeightingAccumulation::Averaged`] sums all of them.
//!
//! Invariants & assumptions
//! ------------------------
//! - The per-sample lists are non-empty and of equal length before any
//!   matrix is built; violations are [`CumulantError::EmptySampleLog`] and
//!   [`CumulantError::SampleLogLengthMismatch`].
//! - Every sample shares the dimension of `R`.
use ndarray::{Array1, Array2, ArrayView2};

use crate::cumulants::{
    errors::{CumulantError, CumulantResult},
    theory::{covariance_map, third_cumulant_map},
};

/// How the squared third-order residuals are combined across samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightingAccumulation {
    /// Only the last sample's squared residual, divided by `n`.
    #[default]
    LastSample,
    /// Sum of all squared residuals, divided by `n`.
    Averaged,
}

/// Ordered per-realisation record of intensities, covariances and third
/// cumulants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleLog {
    intensities: Vec<Array1<f64>>,
    covariances: Vec<Array2<f64>>,
    third_cumulants: Vec<Array2<f64>>,
}

impl SampleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one complete `(L, C, K_c)` sample.
    pub fn push_sample(
        &mut self, intensities: Array1<f64>, covariance: Array2<f64>, third_cumulant: Array2<f64>,
    ) {
        self.intensities.push(intensities);
        self.covariances.push(covariance);
        self.third_cumulants.push(third_cumulant);
    }

    pub fn push_intensities(&mut self, intensities: Array1<f64>) {
        self.intensities.push(intensities);
    }

    pub fn push_covariance(&mut self, covariance: Array2<f64>) {
        self.covariances.push(covariance);
    }

    pub fn push_third_cumulant(&mut self, third_cumulant: Array2<f64>) {
        self.third_cumulants.push(third_cumulant);
    }

    /// Length of the longest list.
    pub fn len(&self) -> usize {
        self.intensities.len().max(self.covariances.len()).max(self.third_cumulants.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn intensities(&self) -> &[Array1<f64>] {
        &self.intensities
    }

    pub fn covariances(&self) -> &[Array2<f64>] {
        &self.covariances
    }

    pub fn third_cumulants(&self) -> &[Array2<f64>] {
        &self.third_cumulants
    }

    pub fn clear(&mut self) {
        self.intensities.clear();
        self.covariances.clear();
        self.third_cumulants.clear();
    }

    fn mismatch(&self) -> CumulantError {
        CumulantError::SampleLogLengthMismatch {
            intensities: self.intensities.len(),
            covariances: self.covariances.len(),
            third_cumulants: self.third_cumulants.len(),
        }
    }
}

/// Second-order weighting matrix `W_2` for the candidate `r`.
///
/// # Errors
/// - [`CumulantError::EmptySampleLog`] when the `L` or `C` list is empty.
/// - [`CumulantError::SampleLogLengthMismatch`] when they differ in length.
/// - [`CumulantError::DimensionMismatch`] when a sample does not match `r`.
pub fn second_order_weighting(
    log: &SampleLog, r: ArrayView2<'_, f64>,
) -> CumulantResult<Array2<f64>> {
    if log.intensities.is_empty() {
        return Err(CumulantError::EmptySampleLog { list: "L" });
    }
    if log.covariances.is_empty() {
        return Err(CumulantError::EmptySampleLog { list: "C" });
    }
    if log.intensities.len() != log.covariances.len() {
        return Err(log.mismatch());
    }

    let dim = r.nrows();
    let mut acc = Array2::<f64>::zeros((dim, dim));
    for (l, c) in log.intensities.iter().zip(&log.covariances) {
        check_sample(dim, l, c, "C")?;
        let residual = covariance_map(l.view(), r) - c;
        acc += &residual.mapv(|x| x * x);
    }
    Ok(acc / log.intensities.len() as f64)
}

/// Third-order weighting matrix `W_3` for the candidate `r`.
///
/// # Errors
/// - [`CumulantError::EmptySampleLog`] when any of the three lists is empty.
/// - [`CumulantError::SampleLogLengthMismatch`] when their lengths differ.
/// - [`CumulantError::DimensionMismatch`] when a sample does not match `r`.
pub fn third_order_weighting(
    log: &SampleLog, r: ArrayView2<'_, f64>, accumulation: WeightingAccumulation,
) -> CumulantResult<Array2<f64>> {
    for (list, empty) in [
        ("L", log.intensities.is_empty()),
        ("C", log.covariances.is_empty()),
        ("K_c", log.third_cumulants.is_empty()),
    ] {
        if empty {
            return Err(CumulantError::EmptySampleLog { list });
        }
    }
    let n = log.intensities.len();
    if log.covariances.len() != n || log.third_cumulants.len() != n {
        return Err(log.mismatch());
    }

    let dim = r.nrows();
    let mut acc = Array2::<f64>::zeros((dim, dim));
    for ((l, c), k) in log.intensities.iter().zip(&log.covariances).zip(&log.third_cumulants) {
        check_sample(dim, l, c, "C")?;
        check_sample(dim, l, k, "K_c")?;
        let residual = third_cumulant_map(l.view(), c.view(), r) - k;
        let squared = residual.mapv(|x| x * x);
        match accumulation {
            WeightingAccumulation::LastSample => acc = squared,
            WeightingAccumulation::Averaged => acc += &squared,
        }
    }
    Ok(acc / n as f64)
}

fn check_sample(
    dim: usize, l: &Array1<f64>, m: &Array2<f64>, what: &'static str,
) -> CumulantResult<()> {
    if l.len() != dim {
        return Err(CumulantError::DimensionMismatch {
            what: "L",
            expected: vec![dim],
            found: vec![l.len()],
        });
    }
    if m.dim() != (dim, dim) {
        return Err(CumulantError::DimensionMismatch {
            what,
            expected: vec![dim, dim],
            found: m.shape().to_vec(),
        });
    }
    Ok(())
}
