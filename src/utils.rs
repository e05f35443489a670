//! Python-side argument extraction for the bindings in `lib.rs`.
#[cfg(feature = "python-bindings")]
use std::str::FromStr;

#[cfg(feature = "python-bindings")]
use ndarray::Array2;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    cumulants::{
        bandwidth::BandwidthRule, options::ExecutionStrategy, weighting::WeightingAccumulation,
    },
    fitting::{FitInit, FitMethod, FitOptions},
    optimization::objective_optimizer::{LineSearcher, SolverMethod, Tolerances},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// One timestamp vector per dimension from a sequence of array-likes.
#[cfg(feature = "python-bindings")]
pub fn extract_sequences<'py>(
    py: Python<'py>, raw: &Bound<'py, PyAny>,
) -> PyResult<Vec<Vec<f64>>> {
    let mut out = Vec::new();
    for item in raw.try_iter()? {
        let arr = extract_f64_array(py, &item?)?;
        let slice = arr.as_slice().map_err(|_| {
            PyValueError::new_err("each event sequence must be a 1-D contiguous float64 array")
        })?;
        out.push(slice.to_vec());
    }
    Ok(out)
}

/// A `d × d` matrix from a nested sequence or a flat row-major sequence of
/// length `d²`.
#[cfg(feature = "python-bindings")]
pub fn extract_square_matrix(raw: &Bound<'_, PyAny>, dim: usize) -> PyResult<Array2<f64>> {
    if let Ok(rows) = raw.extract::<Vec<Vec<f64>>>() {
        if rows.len() != dim || rows.iter().any(|row| row.len() != dim) {
            return Err(PyValueError::new_err(format!("expected a {dim} x {dim} matrix")));
        }
        return Ok(Array2::from_shape_fn((dim, dim), |(i, j)| rows[i][j]));
    }
    let flat: Vec<f64> = raw.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 2-D float64 matrix or a flat row-major sequence",
        )
    })?;
    if flat.len() != dim * dim {
        return Err(PyValueError::new_err(format!(
            "expected {} entries for a {dim} x {dim} matrix, found {}",
            dim * dim,
            flat.len()
        )));
    }
    Ok(Array2::from_shape_fn((dim, dim), |(i, j)| flat[i * dim + j]))
}

#[cfg(feature = "python-bindings")]
pub fn extract_strategy(strategy: Option<&str>) -> PyResult<ExecutionStrategy> {
    match strategy {
        Some(name) => Ok(ExecutionStrategy::from_str(name)?),
        None => Ok(ExecutionStrategy::default()),
    }
}

#[cfg(feature = "python-bindings")]
pub fn extract_bandwidth_rule(
    rule: Option<&str>, grid_size: Option<usize>,
) -> PyResult<BandwidthRule> {
    let rule_str = rule.unwrap_or("uniform").to_lowercase();
    match rule_str.as_str() {
        "uniform" => Ok(BandwidthRule::Uniform),
        "lag_integral" | "minimize_lag_integral" => Ok(BandwidthRule::MinimizeLagIntegral {
            grid_size: grid_size.unwrap_or(crate::cumulants::bandwidth::DEFAULT_GRID_SIZE),
        }),
        other => Err(PyValueError::new_err(format!(
            "invalid bandwidth rule {:?} (expected 'uniform' or 'lag_integral')",
            other
        ))),
    }
}

#[cfg(feature = "python-bindings")]
pub fn extract_accumulation(accumulation: Option<&str>) -> PyResult<WeightingAccumulation> {
    let acc_str = accumulation.unwrap_or("last").to_lowercase();
    match acc_str.as_str() {
        "last" | "last_sample" => Ok(WeightingAccumulation::LastSample),
        "averaged" | "mean" => Ok(WeightingAccumulation::Averaged),
        other => Err(PyValueError::new_err(format!(
            "invalid accumulation {:?} (expected 'last' or 'averaged')",
            other
        ))),
    }
}

/// Starting point for a fit: `None`, `"ones"`, `"identity"`, or a `d × d`
/// matrix.
#[cfg(feature = "python-bindings")]
pub fn extract_fit_init(raw: Option<&Bound<'_, PyAny>>, dim: usize) -> PyResult<FitInit> {
    let Some(raw) = raw else {
        return Ok(FitInit::Ones);
    };
    if let Ok(name) = raw.extract::<String>() {
        return match name.to_lowercase().as_str() {
            "ones" => Ok(FitInit::Ones),
            "identity" | "eye" => Ok(FitInit::Identity),
            other => Err(PyValueError::new_err(format!(
                "invalid init {:?} (expected 'ones', 'identity', or a matrix)",
                other
            ))),
        };
    }
    Ok(FitInit::Matrix(extract_square_matrix(raw, dim)?))
}

/// Row lists for returning a matrix to Python.
#[cfg(feature = "python-bindings")]
pub fn matrix_rows(m: &Array2<f64>) -> Vec<Vec<f64>> {
    m.outer_iter().map(|row| row.to_vec()).collect()
}

#[cfg(feature = "python-bindings")]
pub fn extract_fit_options(
    alpha: f64, method: Option<&str>, learning_rate: Option<f64>, tol_grad: Option<f64>,
    tol_cost: Option<f64>, max_iter: Option<usize>, line_searcher: Option<&str>,
    lbfgs_mem: Option<usize>, init: FitInit, verbose: bool,
) -> PyResult<FitOptions> {
    let defaults = FitOptions::default();
    let method_str = method.unwrap_or("gradient_descent").to_lowercase();
    let fit_method: FitMethod = match method_str.as_str() {
        "gradient_descent" | "gd" => SolverMethod::gradient_descent(
            learning_rate.unwrap_or(crate::fitting::driver::DEFAULT_LEARNING_RATE),
        )?,
        "lbfgs" | "l-bfgs" => {
            let ls = match line_searcher {
                Some(name) => LineSearcher::from_str(name)?,
                None => LineSearcher::MoreThuente,
            };
            SolverMethod::lbfgs(ls, lbfgs_mem)?
        }
        other => {
            return Err(PyValueError::new_err(format!(
                "invalid fit method {:?} (expected 'gradient_descent' or 'lbfgs')",
                other
            )));
        }
    };
    let tols = if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
        defaults.tols
    } else {
        Tolerances::new(tol_grad, tol_cost, max_iter)?
    };
    Ok(FitOptions::new(alpha, fit_method, tols, init, verbose)?)
}
