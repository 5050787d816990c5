//! rust_yeojohnson — covariate-dependent Yeo–Johnson power transform with
//! Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the power transform to Python via the `_rust_yeojohnson`
//! extension module. When the `python-bindings` feature is enabled, this
//! module defines the Python-facing classes and the `power_transform`
//! submodule.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`power_transform` and `optimization`)
//!   as the public crate surface.
//! - Define the `PowerTransformer` `#[pyclass]` and the `#[pymodule]`
//!   initializer for the `_rust_yeojohnson` Python extension.
//! - Register the `power_transform` submodule under `rust_yeojohnson` so
//!   that dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work is implemented in the inner Rust modules; this file
//!   performs only FFI glue, input conversion, and error mapping.
//! - Python callers pass plain 2-D arrays: residuals `(time, location)` (or
//!   `(location, time)` with `time_axis=1`) and predictors
//!   `(year, location)`. Labeled-array handling stays on the Python side.
//!
//! Conventions
//! -----------
//! - Errors from core Rust code are propagated as `PTError`/`OptError`
//!   internally and converted to `ValueError` at the PyO3 boundary.
//! - Coefficients cross the boundary as `(12, n_locations, 2)` arrays.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend directly on
//!   [`power_transform`] and can ignore the PyO3 items guarded by the
//!   `python-bindings` feature.
//! - The library never installs a logger; binaries or the Python host
//!   decide where `log` records go.

pub mod optimization;
pub mod power_transform;
pub mod utils;

#[cfg(feature = "python-bindings")]
use ndarray::Axis;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray2, PyArray3};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    power_transform::{
        FitDiagnostics, FitOptions, LambdaCoefficients, MonthlyResiduals, PowerTransformResult,
        YearlyPredictor, fit_yeo_johnson_transform, inverse_yeo_johnson_transform_series,
        lambdas_from_covariates, yeo_johnson_transform_series,
    },
    utils::{build_fit_options, extract_f64_array2, extract_f64_array3},
};

/// PowerTransformer — Python-facing wrapper for the monthly power transform.
///
/// Purpose
/// -------
/// Hold fit options and, after `fit` (or `from_coefficients`), the fitted
/// coefficient grid; forward `transform`, `inverse_transform`, and
/// `lambda_of` calls to the Rust core.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `PowerTransformer(sd_tol=1e-8, max_iter=400, failure_policy="propagate_nan",
/// parallel=True, min_samples=2, verbose=False)`.
///
/// Notes
/// -----
/// - Native Rust code should call [`fit_yeo_johnson_transform`] and the
///   transform functions directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_yeojohnson.power_transform")]
pub struct PowerTransformer {
    options: FitOptions,
    coefficients: Option<LambdaCoefficients>,
    diagnostics: Option<FitDiagnostics>,
}

#[cfg(feature = "python-bindings")]
impl PowerTransformer {
    fn fitted(&self) -> PyResult<&LambdaCoefficients> {
        self.coefficients.as_ref().ok_or_else(|| {
            PyValueError::new_err("PowerTransformer has not been fitted; call fit() first")
        })
    }

    fn residuals(raw: &Bound<'_, PyAny>, time_axis: usize) -> PyResult<MonthlyResiduals> {
        Ok(MonthlyResiduals::from_axis(extract_f64_array2(raw)?, Axis(time_axis))?)
    }

    fn predictor(raw: &Bound<'_, PyAny>, time_axis: usize) -> PyResult<YearlyPredictor> {
        Ok(YearlyPredictor::from_axis(extract_f64_array2(raw)?, Axis(time_axis))?)
    }

    fn to_python<'py>(
        py: Python<'py>, result: PowerTransformResult, time_axis: usize,
    ) -> (Bound<'py, PyArray2<f64>>, Bound<'py, PyArray3<f64>>) {
        let values = if time_axis == 1 { result.values.reversed_axes() } else { result.values };
        (values.into_pyarray(py), result.lambdas.into_pyarray(py))
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PowerTransformer {
    #[new]
    #[pyo3(
        text_signature = "(sd_tol=1e-8, max_iter=400, failure_policy='propagate_nan', parallel=True, min_samples=2, verbose=False)",
        signature = (sd_tol = None, max_iter = None, failure_policy = None, parallel = None, min_samples = None, verbose = None)
    )]
    pub fn new(
        sd_tol: Option<f64>, max_iter: Option<usize>, failure_policy: Option<&str>,
        parallel: Option<bool>, min_samples: Option<usize>, verbose: Option<bool>,
    ) -> PyResult<Self> {
        let options =
            build_fit_options(sd_tol, max_iter, failure_policy, parallel, min_samples, verbose)?;
        Ok(PowerTransformer { options, coefficients: None, diagnostics: None })
    }

    /// Wrap an existing `(12, n_locations, 2)` coefficient array.
    #[staticmethod]
    pub fn from_coefficients(coeffs: &Bound<'_, PyAny>) -> PyResult<Self> {
        let coefficients = LambdaCoefficients::from_array(extract_f64_array3(coeffs)?)?;
        Ok(PowerTransformer {
            options: FitOptions::default(),
            coefficients: Some(coefficients),
            diagnostics: None,
        })
    }

    /// Fit coefficients for every month and location.
    ///
    /// The GIL is released while fitting.
    #[pyo3(signature = (monthly_residuals, yearly_pred, time_axis = 0))]
    pub fn fit(
        &mut self, py: Python<'_>, monthly_residuals: &Bound<'_, PyAny>,
        yearly_pred: &Bound<'_, PyAny>, time_axis: usize,
    ) -> PyResult<()> {
        let residuals = Self::residuals(monthly_residuals, time_axis)?;
        let predictor = Self::predictor(yearly_pred, time_axis)?;
        let options = self.options.clone();
        let fitted =
            py.allow_threads(|| fit_yeo_johnson_transform(&residuals, &predictor, &options))?;
        self.coefficients = Some(fitted.coefficients);
        self.diagnostics = Some(fitted.diagnostics);
        Ok(())
    }

    /// Returns `(transformed, lambdas)`.
    #[pyo3(signature = (monthly_residuals, yearly_pred, time_axis = 0))]
    pub fn transform<'py>(
        &self, py: Python<'py>, monthly_residuals: &Bound<'py, PyAny>,
        yearly_pred: &Bound<'py, PyAny>, time_axis: usize,
    ) -> PyResult<(Bound<'py, PyArray2<f64>>, Bound<'py, PyArray3<f64>>)> {
        let coeffs = self.fitted()?;
        let residuals = Self::residuals(monthly_residuals, time_axis)?;
        let predictor = Self::predictor(yearly_pred, time_axis)?;
        let result = yeo_johnson_transform_series(&residuals, coeffs, &predictor)?;
        Ok(Self::to_python(py, result, time_axis))
    }

    /// Returns `(original_scale_values, lambdas)`.
    #[pyo3(signature = (values, yearly_pred, time_axis = 0))]
    pub fn inverse_transform<'py>(
        &self, py: Python<'py>, values: &Bound<'py, PyAny>, yearly_pred: &Bound<'py, PyAny>,
        time_axis: usize,
    ) -> PyResult<(Bound<'py, PyArray2<f64>>, Bound<'py, PyArray3<f64>>)> {
        let coeffs = self.fitted()?;
        let values = Self::residuals(values, time_axis)?;
        let predictor = Self::predictor(yearly_pred, time_axis)?;
        let result = inverse_yeo_johnson_transform_series(&values, coeffs, &predictor)?;
        Ok(Self::to_python(py, result, time_axis))
    }

    /// Lambdas `(month, location, year)` for a yearly predictor.
    #[pyo3(signature = (yearly_pred, time_axis = 0))]
    pub fn lambda_of<'py>(
        &self, py: Python<'py>, yearly_pred: &Bound<'py, PyAny>, time_axis: usize,
    ) -> PyResult<Bound<'py, PyArray3<f64>>> {
        let coeffs = self.fitted()?;
        let predictor = Self::predictor(yearly_pred, time_axis)?;
        Ok(lambdas_from_covariates(coeffs, &predictor)?.into_pyarray(py))
    }

    /// Fitted `(12, n_locations, 2)` coefficients.
    #[getter]
    pub fn coefficients<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray3<f64>>> {
        Ok(self.fitted()?.as_array().clone().into_pyarray(py))
    }

    /// Number of units whose fit failed (NaN coefficients).
    #[getter]
    pub fn n_failed(&self) -> usize {
        self.diagnostics.as_ref().map_or(0, FitDiagnostics::n_failed)
    }

    /// Number of units that stopped at the iteration cap.
    #[getter]
    pub fn n_not_converged(&self) -> usize {
        self.diagnostics.as_ref().map_or(0, FitDiagnostics::n_not_converged)
    }
}

/// _rust_yeojohnson — PyO3 module initializer for the Python extension.
///
/// Creates the `power_transform` submodule, attaches it to the parent
/// module, and registers it in `sys.modules` so it is importable via a
/// dotted path.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_yeojohnson<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let power_transform_mod = PyModule::new(_py, "power_transform")?;
    power_transform_module(_py, m, &power_transform_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_yeojohnson.power_transform", power_transform_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn power_transform_module<'py>(
    _py: Python, rust_yeojohnson: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PowerTransformer>()?;
    rust_yeojohnson.add_submodule(m)?;
    Ok(())
}
