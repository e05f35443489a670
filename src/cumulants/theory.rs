//! Theoretical integrated cumulants implied by a kernel-integral matrix.
//!
//! For a stationary Hawkes process with kernel-integral matrix `R = (I − G)⁻¹`
//! and average intensity `L`, the integrated covariance and the contracted
//! third cumulant are polynomial in `R`:
//!
//! - `C = R·diag(L)·Rᵀ`
//! - `K_c = (R∘R)·Cᵀ + 2·(R∘(C − R·diag(L)))·Rᵀ`
//!
//! The same maps serve two callers: the session (ground-truth comparison) and
//! the moment-matching loss in [`crate::fitting`], which evaluates them at the
//! current iterate with the empirical `C` plugged in.
use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::cumulants::errors::{CumulantError, CumulantResult};

/// Kernel-integral input, either flattened row-major (`d²` entries) or a
/// `d × d` matrix.
#[derive(Debug, Clone, Copy)]
pub enum KernelIntegrals<'a> {
    Flat(ArrayView1<'a, f64>),
    Matrix(ArrayView2<'a, f64>),
}

impl<'a> KernelIntegrals<'a> {
    /// Owned `d × d` matrix, reshaping flattened input row-major.
    ///
    /// # Errors
    /// [`CumulantError::KernelIntegralShape`] when the input has neither `d²`
    /// entries nor shape `(d, d)`.
    pub fn into_matrix(self, dim: usize) -> CumulantResult<Array2<f64>> {
        match self {
            KernelIntegrals::Flat(flat) if flat.len() == dim * dim => {
                Ok(Array2::from_shape_fn((dim, dim), |(i, j)| flat[i * dim + j]))
            }
            KernelIntegrals::Flat(flat) => {
                Err(CumulantError::KernelIntegralShape { dim, found: vec![flat.len()] })
            }
            KernelIntegrals::Matrix(m) if m.dim() == (dim, dim) => Ok(m.to_owned()),
            KernelIntegrals::Matrix(m) => {
                Err(CumulantError::KernelIntegralShape { dim, found: m.shape().to_vec() })
            }
        }
    }
}

impl<'a> From<ArrayView2<'a, f64>> for KernelIntegrals<'a> {
    fn from(m: ArrayView2<'a, f64>) -> Self {
        KernelIntegrals::Matrix(m)
    }
}

impl<'a> From<ArrayView1<'a, f64>> for KernelIntegrals<'a> {
    fn from(flat: ArrayView1<'a, f64>) -> Self {
        KernelIntegrals::Flat(flat)
    }
}

/// `R·diag(L)·Rᵀ` for a square `R` and intensities of matching length.
pub fn covariance_map(intensities: ArrayView1<'_, f64>, r: ArrayView2<'_, f64>) -> Array2<f64> {
    let scaled = &r * &intensities;
    scaled.dot(&r.t())
}

/// `(R∘R)·Cᵀ + 2·(R∘(C − R·diag(L)))·Rᵀ`.
pub fn third_cumulant_map(
    intensities: ArrayView1<'_, f64>, covariance: ArrayView2<'_, f64>, r: ArrayView2<'_, f64>,
) -> Array2<f64> {
    let r_squared = &r * &r;
    let centered = &covariance - &(&r * &intensities);
    let mut k = r_squared.dot(&covariance.t());
    k.scaled_add(2.0, &(&r * &centered).dot(&r.t()));
    k
}

/// Theoretical covariance `C_th` for the given ground truth.
///
/// # Errors
/// [`CumulantError::KernelIntegralShape`] when `r` does not match
/// `intensities.len()`.
pub fn theoretical_covariance(
    intensities: ArrayView1<'_, f64>, r: KernelIntegrals<'_>,
) -> CumulantResult<Array2<f64>> {
    let r = r.into_matrix(intensities.len())?;
    Ok(covariance_map(intensities, r.view()))
}

/// Theoretical third cumulant `K_c_th` given the theoretical covariance.
///
/// # Errors
/// - [`CumulantError::KernelIntegralShape`] when `r` does not match
///   `intensities.len()`.
/// - [`CumulantError::DimensionMismatch`] when `covariance` is not `d × d`.
pub fn theoretical_third_cumulant(
    intensities: ArrayView1<'_, f64>, covariance: ArrayView2<'_, f64>, r: KernelIntegrals<'_>,
) -> CumulantResult<Array2<f64>> {
    let dim = intensities.len();
    if covariance.dim() != (dim, dim) {
        return Err(CumulantError::DimensionMismatch {
            what: "covariance",
            expected: vec![dim, dim],
            found: covariance.shape().to_vec(),
        });
    }
    let r = r.into_matrix(dim)?;
    Ok(third_cumulant_map(intensities, covariance, r.view()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Hand-computed 2 × 2 values of both theoretical maps.
    // - The Poisson case `R = I`.
    // - Flattened versus matrix kernel-integral input and shape errors.
    // -------------------------------------------------------------------------

    fn assert_matrix_close(actual: &Array2<f64>, expected: &Array2<f64>) {
        assert_eq!(actual.dim(), expected.dim());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-12, "actual = {actual}, expected = {expected}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Check both maps against values worked out by hand.
    //
    // Given
    // -----
    // - `R = [[1, 0.5], [0, 1]]`, `L = [1, 2]`.
    //
    // Expect
    // ------
    // - `C_th = [[1.5, 1], [1, 2]]`.
    // - `K_c_th = [[2.75, 1.5], [1, 2]]`.
    fn theoretical_cumulants_match_hand_computed_values() {
        let r = array![[1.0, 0.5], [0.0, 1.0]];
        let l = array![1.0, 2.0];

        let c = theoretical_covariance(l.view(), r.view().into()).unwrap();
        let k = theoretical_third_cumulant(l.view(), c.view(), r.view().into()).unwrap();

        assert_matrix_close(&c, &array![[1.5, 1.0], [1.0, 2.0]]);
        assert_matrix_close(&k, &array![[2.75, 1.5], [1.0, 2.0]]);
    }

    #[test]
    // Purpose
    // -------
    // Without excitation both cumulants reduce to `diag(L)`.
    //
    // Given
    // -----
    // - `R = I₃`, `L = [0.5, 1, 3]`.
    //
    // Expect
    // ------
    // - `C_th == K_c_th == diag(L)`.
    fn theoretical_cumulants_reduce_to_intensities_for_poisson() {
        let l = array![0.5, 1.0, 3.0];
        let r = Array2::<f64>::eye(3);

        let c = theoretical_covariance(l.view(), r.view().into()).unwrap();
        let k = theoretical_third_cumulant(l.view(), c.view(), r.view().into()).unwrap();

        let expected = Array2::from_diag(&l);
        assert_matrix_close(&c, &expected);
        assert_matrix_close(&k, &expected);
    }

    #[test]
    // Purpose
    // -------
    // Flattened input is reshaped row-major before every term.
    //
    // Given
    // -----
    // - The 2 × 2 fixture passed as a length-4 vector.
    //
    // Expect
    // ------
    // - Identical results to the matrix input.
    fn flattened_kernel_integrals_match_matrix_input() {
        let r = array![[1.0, 0.5], [0.0, 1.0]];
        let flat = Array1::from_iter(r.iter().copied());
        let l = array![1.0, 2.0];
        let c = theoretical_covariance(l.view(), r.view().into()).unwrap();

        let k_matrix = theoretical_third_cumulant(l.view(), c.view(), r.view().into()).unwrap();
        let k_flat = theoretical_third_cumulant(l.view(), c.view(), flat.view().into()).unwrap();

        assert_eq!(k_matrix, k_flat);
    }

    #[test]
    fn kernel_integrals_reject_wrong_shape() {
        let flat = array![1.0, 2.0, 3.0];
        let matrix = Array2::<f64>::zeros((2, 3));

        let flat_err = KernelIntegrals::from(flat.view()).into_matrix(2).unwrap_err();
        let matrix_err = KernelIntegrals::from(matrix.view()).into_matrix(2).unwrap_err();

        assert_eq!(flat_err, CumulantError::KernelIntegralShape { dim: 2, found: vec![3] });
        assert_eq!(matrix_err, CumulantError::KernelIntegralShape { dim: 2, found: vec![2, 3] });
    }
}
