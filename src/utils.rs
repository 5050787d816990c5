//! Conversion helpers for the Python bindings.
//!
//! Turn array-likes coming from Python (numpy arrays, pandas/xarray objects
//! exposing `to_numpy`, nested sequences) into owned `ndarray` grids, and
//! assemble validated [`FitOptions`] from keyword arguments.
#[cfg(feature = "python-bindings")]
use ndarray::{Array2, Array3};

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArray2, PyReadonlyArray3};

#[cfg(feature = "python-bindings")]
use crate::{
    optimization::loglik_optimizer::traits::{MLEOptions, Tolerances},
    power_transform::core::options::{FailurePolicy, FitOptions},
};

/// Extract a 2-D `f64` grid from a numpy array, an object with `to_numpy()`,
/// or a rectangular sequence of sequences.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_array2(raw_data: &Bound<'_, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr_ro.as_array().to_owned());
    }

    if let Ok(obj) = raw_data.call_method0("to_numpy") {
        if let Ok(arr_ro) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(arr_ro.as_array().to_owned());
        }
    }

    let rows: Vec<Vec<f64>> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 2-D numpy.ndarray, DataFrame, or nested sequence of float64")
    })?;
    let n_cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != n_cols) {
        return Err(PyValueError::new_err("nested sequence rows must all have the same length"));
    }
    let n_rows = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|err| PyValueError::new_err(err.to_string()))
}

/// Extract a 3-D `f64` coefficient grid from a numpy array.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_array3(raw_data: &Bound<'_, PyAny>) -> PyResult<Array3<f64>> {
    let arr_ro = raw_data.extract::<PyReadonlyArray3<f64>>().map_err(|_| {
        PyTypeError::new_err("expected a 3-D numpy.ndarray of float64 (month, location, coeff)")
    })?;
    Ok(arr_ro.as_array().to_owned())
}

/// Build validated [`FitOptions`] from Python keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn build_fit_options(
    sd_tol: Option<f64>, max_iter: Option<usize>, failure_policy: Option<&str>,
    parallel: Option<bool>, min_samples: Option<usize>, verbose: Option<bool>,
) -> PyResult<FitOptions> {
    let defaults = FitOptions::default();

    let tols = Tolerances::new(
        sd_tol.or(defaults.mle_opts.tols.sd_tol),
        max_iter.or(defaults.mle_opts.tols.max_iter),
    )?;
    let mle_opts = MLEOptions::new(tols, verbose.unwrap_or(false));

    let policy = match failure_policy {
        Some(raw) => raw.parse::<FailurePolicy>().map_err(PyValueError::new_err)?,
        None => defaults.failure_policy,
    };

    Ok(FitOptions::new(
        mle_opts,
        policy,
        parallel.unwrap_or(defaults.parallel),
        min_samples.unwrap_or(defaults.min_samples),
    )?)
}
