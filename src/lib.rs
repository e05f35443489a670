//! hawkes_cumulants — integrated-cumulant estimation for multivariate Hawkes
//! processes, with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the cumulant session and the kernel-integral fit to Python via the
//! `_hawkes_cumulants` extension module. When the `python-bindings` feature is
//! enabled, this module defines the Python-facing classes and the
//! `hawkes_cumulants.cumulants` / `hawkes_cumulants.fitting` submodules.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`process`, `cumulants`, `fitting`,
//!   `optimization`) as the public crate surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_hawkes_cumulants` Python extension.
//! - Register the Python submodules in `sys.modules` so dot-notation imports
//!   work.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, input conversion, and error mapping.
//! - Matrices cross the boundary as lists of rows (row-major); kernel-integral
//!   inputs may also be flat row-major sequences of length `d²`.
//!
//! Conventions
//! -----------
//! - Errors from core code stay typed internally (`ProcessError`,
//!   `CumulantError`, `OptError`) and become `ValueError` at the PyO3 boundary.
//! - A bandwidth of `None` means the session default `h_max`.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on the inner modules directly and can
//!   ignore the items gated by `python-bindings`.
//! - Typical Rust flow: build a [`cumulants::Cumulants`] session from sorted
//!   timestamps, run [`cumulants::Cumulants::compute_all`], then pass
//!   [`cumulants::Cumulants::moments`] to [`fitting::fit_kernel_integrals`].
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   integration suite under `tests/`.

pub mod cumulants;
pub mod fitting;
pub mod optimization;
pub mod process;
pub mod utils;

#[cfg(feature = "python-bindings")]
use std::collections::HashMap;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    cumulants::{
        bundle::CumulantBundle,
        engine::Cumulants,
        options::CumulantOptions,
        progress::{ProgressSink, RecordingProgress, Stage, TracingProgress},
        theory::KernelIntegrals,
    },
    fitting::{fit_kernel_integrals, KernelFit},
    process::{EventSequence, ProcessCollection},
    utils::{
        extract_accumulation, extract_bandwidth_rule, extract_fit_init, extract_fit_options,
        extract_sequences, extract_square_matrix, extract_strategy, matrix_rows,
    },
};

/// HawkesCumulants — Python-facing wrapper for the integrated-cumulant session.
///
/// Purpose
/// -------
/// Expose [`Cumulants`] to Python: build a session from event sequences, run
/// the estimator stages, inspect the resulting arrays, and fit the
/// kernel-integral matrix.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `HawkesCumulants(sequences, h_max=40.0, strategy=None, consistent=False, sort=False)`:
/// - `sequences`: iterable of 1-D float64 array-likes, one per dimension.
/// - `h_max`: default bandwidth, finite and `> 0`.
/// - `strategy`: `"parallel"` (default), `"sequential"` or `"classic"`.
/// - `consistent`: use the corrected trend and the balanced `K_c` formula.
/// - `sort`: sort each sequence before validation.
///
/// Fields
/// ------
/// - `inner`: [`Cumulants`]
///   Session owning the sequences and every derived array.
///
/// Notes
/// -----
/// - Native Rust callers should use [`Cumulants`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "hawkes_cumulants.cumulants", unsendable)]
pub struct HawkesCumulants {
    pub inner: Cumulants,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl HawkesCumulants {
    #[new]
    #[pyo3(
        signature = (sequences, h_max = 40.0, strategy = None, consistent = false, sort = false),
        text_signature = "(sequences, /, h_max=40.0, strategy=None, consistent=False, sort=False)"
    )]
    pub fn new<'py>(
        py: Python<'py>, sequences: &Bound<'py, PyAny>, h_max: f64, strategy: Option<&str>,
        consistent: bool, sort: bool,
    ) -> PyResult<Self> {
        let strategy = extract_strategy(strategy)?;
        let options = if consistent {
            CumulantOptions::consistent(h_max, strategy)?
        } else {
            CumulantOptions::new(h_max, strategy)?
        };
        let raw = extract_sequences(py, sequences)?;
        let inner = if sort {
            let sequences =
                raw.into_iter().map(EventSequence::from_unsorted).collect::<Result<Vec<_>, _>>()?;
            Cumulants::new(ProcessCollection::new(sequences), options)
        } else {
            Cumulants::from_sequences(raw, options)?
        };
        Ok(HawkesCumulants { inner })
    }

    /// Rebuild a session from a JSON bundle.
    #[staticmethod]
    #[pyo3(text_signature = "(json, /)")]
    pub fn from_json(json: &str) -> PyResult<Self> {
        let bundle = CumulantBundle::from_json(json)?;
        Ok(HawkesCumulants { inner: Cumulants::from_bundle(bundle)? })
    }

    /// Serialize the sequences and every computed array to JSON.
    pub fn to_json(&self) -> PyResult<String> {
        Ok(self.inner.to_bundle().to_json()?)
    }

    #[getter]
    pub fn dim(&self) -> usize {
        self.inner.dim()
    }

    #[getter]
    pub fn horizon(&self) -> f64 {
        self.inner.horizon()
    }

    #[getter]
    pub fn intensities(&self) -> Vec<f64> {
        self.inner.intensities().to_vec()
    }

    #[pyo3(signature = (h = None), text_signature = "(h=None)")]
    pub fn compute_covariance(&mut self, h: Option<f64>) -> PyResult<Vec<Vec<f64>>> {
        Ok(matrix_rows(self.inner.compute_covariance(h)?))
    }

    #[pyo3(signature = (h = None), text_signature = "(h=None)")]
    pub fn compute_integrated_intensity(&mut self, h: Option<f64>) -> PyResult<Vec<Vec<f64>>> {
        Ok(matrix_rows(self.inner.compute_integrated_intensity(h)?))
    }

    /// `E_c` as a `d × d × 2` nested list.
    #[pyo3(signature = (h = None), text_signature = "(h=None)")]
    pub fn compute_third_moment_tensor(
        &mut self, h: Option<f64>,
    ) -> PyResult<Vec<Vec<Vec<f64>>>> {
        let e_c = self.inner.compute_third_moment_tensor(h)?;
        Ok(e_c.outer_iter().map(|plane| matrix_rows(&plane.to_owned())).collect())
    }

    #[pyo3(signature = (h = None), text_signature = "(h=None)")]
    pub fn compute_empirical_third_cumulant(
        &mut self, h: Option<f64>,
    ) -> PyResult<Vec<Vec<f64>>> {
        Ok(matrix_rows(self.inner.compute_empirical_third_cumulant(h)?))
    }

    #[pyo3(signature = (h = None), text_signature = "(h=None)")]
    pub fn compute_alternative_third_cumulant(
        &mut self, h: Option<f64>,
    ) -> PyResult<Vec<Vec<f64>>> {
        Ok(matrix_rows(self.inner.compute_alternative_third_cumulant(h)?))
    }

    /// Run every stage and return the completed stage labels in order.
    #[pyo3(
        signature = (h = None, log_progress = false),
        text_signature = "(h=None, log_progress=False)"
    )]
    pub fn compute_all(&mut self, h: Option<f64>, log_progress: bool) -> PyResult<Vec<String>> {
        let recorder = RecordingProgress::new();
        let sink = |stage: Stage| {
            recorder.stage_completed(stage);
            if log_progress {
                TracingProgress.stage_completed(stage);
            }
        };
        self.inner.compute_all(h, &sink)?;
        Ok(recorder.stages().iter().map(|s| s.label().to_string()).collect())
    }

    #[pyo3(
        signature = (rule = None, grid_size = None),
        text_signature = "(rule=None, grid_size=None)"
    )]
    pub fn select_bandwidths(
        &mut self, rule: Option<&str>, grid_size: Option<usize>,
    ) -> PyResult<Vec<Vec<f64>>> {
        let rule = extract_bandwidth_rule(rule, grid_size)?;
        Ok(matrix_rows(self.inner.select_bandwidths(rule)?))
    }

    /// Store the true kernel-integral matrix (`d × d` or flat row-major).
    #[pyo3(text_signature = "(r, /)")]
    pub fn set_ground_truth(&mut self, r: &Bound<'_, PyAny>) -> PyResult<()> {
        let r = extract_square_matrix(r, self.inner.dim())?;
        self.inner.set_ground_truth(KernelIntegrals::Matrix(r.view()))?;
        Ok(())
    }

    pub fn compute_theoretical_covariance(&mut self) -> PyResult<Vec<Vec<f64>>> {
        Ok(matrix_rows(self.inner.compute_theoretical_covariance()?))
    }

    pub fn compute_theoretical_third_cumulant(&mut self) -> PyResult<Vec<Vec<f64>>> {
        Ok(matrix_rows(self.inner.compute_theoretical_third_cumulant()?))
    }

    /// Append the current `(L, C, K_c)` to the sample log.
    pub fn push_current_sample(&mut self) -> PyResult<()> {
        Ok(self.inner.push_current_sample()?)
    }

    #[pyo3(text_signature = "(r, /)")]
    pub fn set_second_order_weighting(
        &mut self, r: &Bound<'_, PyAny>,
    ) -> PyResult<Vec<Vec<f64>>> {
        let r = extract_square_matrix(r, self.inner.dim())?;
        Ok(matrix_rows(self.inner.set_second_order_weighting(KernelIntegrals::Matrix(r.view()))?))
    }

    #[pyo3(signature = (r, accumulation = None), text_signature = "(r, /, accumulation=None)")]
    pub fn set_third_order_weighting(
        &mut self, r: &Bound<'_, PyAny>, accumulation: Option<&str>,
    ) -> PyResult<Vec<Vec<f64>>> {
        let r = extract_square_matrix(r, self.inner.dim())?;
        let accumulation = extract_accumulation(accumulation)?;
        let w3 = self
            .inner
            .set_third_order_weighting(KernelIntegrals::Matrix(r.view()), accumulation)?;
        Ok(matrix_rows(w3))
    }

    #[getter]
    pub fn covariance(&self) -> Option<Vec<Vec<f64>>> {
        self.inner.covariance().map(matrix_rows)
    }

    #[getter]
    pub fn integrated_intensity(&self) -> Option<Vec<Vec<f64>>> {
        self.inner.integrated_intensity().map(matrix_rows)
    }

    #[getter]
    pub fn third_cumulant(&self) -> Option<Vec<Vec<f64>>> {
        self.inner.third_cumulant().map(matrix_rows)
    }

    #[getter]
    pub fn alternative_third_cumulant(&self) -> Option<Vec<Vec<f64>>> {
        self.inner.alternative_third_cumulant().map(matrix_rows)
    }

    #[getter]
    pub fn bandwidths(&self) -> Option<Vec<Vec<f64>>> {
        self.inner.bandwidths().map(matrix_rows)
    }

    #[getter]
    pub fn theoretical_covariance(&self) -> Option<Vec<Vec<f64>>> {
        self.inner.theoretical_covariance().map(matrix_rows)
    }

    #[getter]
    pub fn theoretical_third_cumulant(&self) -> Option<Vec<Vec<f64>>> {
        self.inner.theoretical_third_cumulant().map(matrix_rows)
    }

    /// Fit the kernel-integral matrix to the session's `(L, C, K_c)`.
    ///
    /// Defaults reproduce the reference fit: all-ones start, `alpha = 10`,
    /// ten descent steps at learning rate `1e4`. That step diverges on
    /// moments of order one and the call then raises `ValueError`; pass
    /// `method="lbfgs"` or a learning rate near `1e-3` for such data.
    #[pyo3(
        signature = (
            alpha = 10.0,
            method = None,
            learning_rate = None,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            line_searcher = None,
            lbfgs_mem = None,
            init = None,
            verbose = false,
        ),
        text_signature = "(alpha=10.0, method=None, learning_rate=None, tol_grad=None, \
                          tol_cost=None, max_iter=None, line_searcher=None, lbfgs_mem=None, \
                          init=None, verbose=False)"
    )]
    pub fn fit<'py>(
        &self, alpha: f64, method: Option<&str>, learning_rate: Option<f64>,
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
        line_searcher: Option<&str>, lbfgs_mem: Option<usize>, init: Option<&Bound<'py, PyAny>>,
        verbose: bool,
    ) -> PyResult<KernelFitResult> {
        let moments = self.inner.moments()?;
        let init = extract_fit_init(init, self.inner.dim())?;
        let options = extract_fit_options(
            alpha,
            method,
            learning_rate,
            tol_grad,
            tol_cost,
            max_iter,
            line_searcher,
            lbfgs_mem,
            init,
            verbose,
        )?;
        let inner = fit_kernel_integrals(&moments, &options)?;
        Ok(KernelFitResult { inner })
    }
}

/// KernelFitResult — Python-facing view of a [`KernelFit`].
///
/// Exposes the estimated matrix `R̂` and the optimizer diagnostics as
/// read-only properties.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "hawkes_cumulants.fitting")]
pub struct KernelFitResult {
    inner: KernelFit,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl KernelFitResult {
    #[getter]
    pub fn r_hat(&self) -> Vec<Vec<f64>> {
        matrix_rows(&self.inner.r_hat)
    }

    #[getter]
    pub fn loss(&self) -> f64 {
        self.inner.loss()
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.outcome.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.outcome.status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.outcome.iterations
    }

    #[getter]
    pub fn grad_norm(&self) -> Option<f64> {
        self.inner.outcome.grad_norm
    }

    #[getter]
    pub fn fn_evals(&self) -> HashMap<String, u64> {
        self.inner.outcome.fn_evals.clone()
    }
}

#[cfg(feature = "python-bindings")]
#[pymodule]
fn _hawkes_cumulants<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let cumulants_mod = PyModule::new(_py, "cumulants")?;
    let fitting_mod = PyModule::new(_py, "fitting")?;
    cumulants(_py, m, &cumulants_mod)?;
    fitting(_py, m, &fitting_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("hawkes_cumulants.cumulants", cumulants_mod)?;
    _py.import("sys")?.getattr("modules")?.set_item("hawkes_cumulants.fitting", fitting_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn cumulants<'py>(
    _py: Python, hawkes_cumulants: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<HawkesCumulants>()?;
    hawkes_cumulants.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn fitting<'py>(
    _py: Python, hawkes_cumulants: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<KernelFitResult>()?;
    hawkes_cumulants.add_submodule(m)?;
    Ok(())
}
