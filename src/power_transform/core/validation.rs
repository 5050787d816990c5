//! Validation helpers for the power transform.
//!
//! Centralizes the cross-input consistency checks (location and year axes,
//! coefficient grids) and the pairwise NaN filtering applied before each
//! fit. Single-container invariants are enforced by the constructors in
//! [`data`](crate::power_transform::core::data).
use crate::power_transform::{
    core::data::{LambdaCoefficients, MonthlyResiduals, YearlyPredictor},
    errors::{PTError, PTResult},
};
use ndarray::{Array1, ArrayView1};

/// Check that residuals and predictor share the location axis and that the
/// predictor has exactly one value per residual year.
///
/// Errors
/// ------
/// - `PTError::LocationMismatch` if the location counts differ.
/// - `PTError::YearMismatch` if `predictor.n_years() != residuals.n_years()`.
pub fn validate_alignment(
    residuals: &MonthlyResiduals, predictor: &YearlyPredictor,
) -> PTResult<()> {
    if residuals.n_locations() != predictor.n_locations() {
        return Err(PTError::LocationMismatch {
            residuals: residuals.n_locations(),
            predictor: predictor.n_locations(),
        });
    }
    if residuals.n_years() != predictor.n_years() {
        return Err(PTError::YearMismatch {
            expected: residuals.n_years(),
            actual: predictor.n_years(),
        });
    }
    Ok(())
}

/// Check that a coefficient grid covers the predictor's locations.
///
/// Errors
/// ------
/// - `PTError::LocationMismatch` with the coefficient count in the
///   `residuals` slot.
pub fn validate_coefficients(
    coeffs: &LambdaCoefficients, predictor: &YearlyPredictor,
) -> PTResult<()> {
    if coeffs.n_locations() != predictor.n_locations() {
        return Err(PTError::LocationMismatch {
            residuals: coeffs.n_locations(),
            predictor: predictor.n_locations(),
        });
    }
    Ok(())
}

/// Drop every index where the residual or the predictor is NaN.
///
/// Errors
/// ------
/// - `PTError::LengthMismatch` if the two series differ in length.
pub fn drop_nan_pairs(
    residuals: ArrayView1<f64>, predictor: ArrayView1<f64>,
) -> PTResult<(Array1<f64>, Array1<f64>)> {
    if residuals.len() != predictor.len() {
        return Err(PTError::LengthMismatch { expected: residuals.len(), actual: predictor.len() });
    }
    let (kept_r, kept_y): (Vec<f64>, Vec<f64>) = residuals
        .iter()
        .zip(predictor.iter())
        .filter(|(r, y)| !r.is_nan() && !y.is_nan())
        .map(|(&r, &y)| (r, y))
        .unzip();
    Ok((Array1::from(kept_r), Array1::from(kept_y)))
}
