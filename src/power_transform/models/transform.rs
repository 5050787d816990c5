//! Transform orchestration — apply fitted coefficients to whole series.
//!
//! Lambdas are evaluated per `(month, location, year)` from the logistic
//! model, expanded onto the `(time, location)` grid with `t = 12·year +
//! month`, and fed element-wise to the forward or inverse kernel. NaN
//! coefficients (failed units) and NaN inputs yield NaN outputs.
use crate::power_transform::{
    core::{
        data::{LambdaCoefficients, MonthlyResiduals, N_MONTHS, YearlyPredictor},
        kernels::{inverse_yeo_johnson_scalar, yeo_johnson_scalar},
        lambda::lambda_function,
        validation::{validate_alignment, validate_coefficients},
    },
    errors::PTResult,
};
use ndarray::{Array2, Array3, Zip};

/// Output of a forward or inverse transform.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerTransformResult {
    /// Transformed (or inverted) values, `(time, location)`.
    pub values: Array2<f64>,
    /// Lambdas used, `(month, location, year)`.
    pub lambdas: Array3<f64>,
}

impl PowerTransformResult {
    /// Lambdas expanded onto the `(time, location)` grid of `values`.
    pub fn lambdas_per_sample(&self) -> Array2<f64> {
        expand_lambdas(&self.lambdas)
    }
}

fn expand_lambdas(lambdas: &Array3<f64>) -> Array2<f64> {
    let (_, n_locations, n_years) = lambdas.dim();
    Array2::from_shape_fn((N_MONTHS * n_years, n_locations), |(t, l)| {
        lambdas[[t % N_MONTHS, l, t / N_MONTHS]]
    })
}

/// lambdas_from_covariates — evaluate `λ` for every month, location, year.
///
/// Errors
/// ------
/// - `PTError::LocationMismatch` if the coefficient grid and predictor
///   disagree on the number of locations.
pub fn lambdas_from_covariates(
    coeffs: &LambdaCoefficients, predictor: &YearlyPredictor,
) -> PTResult<Array3<f64>> {
    validate_coefficients(coeffs, predictor)?;
    let covariates = predictor.view();
    Ok(Array3::from_shape_fn(
        (N_MONTHS, predictor.n_locations(), predictor.n_years()),
        |(month, location, year)| {
            lambda_function(coeffs.coeffs(month, location), covariates[[year, location]])
        },
    ))
}

/// Standalone lambda evaluation for diagnostics; alias of
/// [`lambdas_from_covariates`].
pub fn lambda_of(
    coeffs: &LambdaCoefficients, predictor: &YearlyPredictor,
) -> PTResult<Array3<f64>> {
    lambdas_from_covariates(coeffs, predictor)
}

fn apply_kernel(
    values: &MonthlyResiduals, coeffs: &LambdaCoefficients, predictor: &YearlyPredictor,
    kernel: fn(f64, f64) -> f64,
) -> PTResult<PowerTransformResult> {
    validate_alignment(values, predictor)?;
    let lambdas = lambdas_from_covariates(coeffs, predictor)?;
    let per_sample = expand_lambdas(&lambdas);
    let values = Zip::from(values.view())
        .and(&per_sample)
        .map_collect(|&x, &lambda| kernel(x, lambda));
    Ok(PowerTransformResult { values, lambdas })
}

/// yeo_johnson_transform_series — forward transform of monthly residuals.
///
/// Errors
/// ------
/// - `PTError::LocationMismatch` / `PTError::YearMismatch` for misaligned
///   inputs.
pub fn yeo_johnson_transform_series(
    residuals: &MonthlyResiduals, coeffs: &LambdaCoefficients, predictor: &YearlyPredictor,
) -> PTResult<PowerTransformResult> {
    apply_kernel(residuals, coeffs, predictor, yeo_johnson_scalar)
}

/// inverse_yeo_johnson_transform_series — map transformed values back to
/// the original scale.
///
/// Errors
/// ------
/// - `PTError::LocationMismatch` / `PTError::YearMismatch` for misaligned
///   inputs.
pub fn inverse_yeo_johnson_transform_series(
    values: &MonthlyResiduals, coeffs: &LambdaCoefficients, predictor: &YearlyPredictor,
) -> PTResult<PowerTransformResult> {
    apply_kernel(values, coeffs, predictor, inverse_yeo_johnson_scalar)
}
