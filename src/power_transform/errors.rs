//! Errors for the covariate-dependent power transform (input shapes,
//! coefficient validation, per-unit fitting failures).
//!
//! This module defines the domain error type, [`PTError`], used by the data
//! containers, the transform kernels, and the monthly fitting orchestration.
//! It implements `Display`/`Error` and, with the `python-bindings` feature,
//! converts to `PyErr` for PyO3.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy); months run `0..12`.
//! - Residual grids are laid out `(time, location)`, predictor grids
//!   `(year, location)`, coefficient grids `(month, location, coeff)`.
//! - Optimizer/backend errors are normalized to
//!   [`PTError::OptimizationFailed`] with a human-readable status, except
//!   for the domain conditions the likelihood itself raises.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::optimization::errors::OptError;

/// Crate-wide result alias for power-transform operations.
pub type PTResult<T> = Result<T, PTError>;

/// Unified error type for the power transform.
#[derive(Debug, Clone, PartialEq)]
pub enum PTError {
    // ---- Input/shape validation ----
    /// An input grid has no samples or no locations.
    EmptyInput,

    /// Requested time/year axis does not exist on a 2-D grid.
    InvalidAxis { axis: usize },

    /// The time axis does not cover whole years of monthly samples.
    IncompleteYears { n_time: usize },

    /// Residuals and predictor disagree on the number of locations.
    LocationMismatch { residuals: usize, predictor: usize },

    /// Predictor year count does not match the residual series.
    YearMismatch { expected: usize, actual: usize },

    /// Coefficient grid is not shaped `(12, n_locations, 2)`.
    CoeffShape { expected: (usize, usize, usize), found: (usize, usize, usize) },

    /// A stored coefficient pair is outside the admissible region.
    InvalidCoefficient { month: usize, location: usize, value: f64, reason: &'static str },

    /// Paired 1-D inputs have different lengths.
    LengthMismatch { expected: usize, actual: usize },

    // ---- Options ----
    /// `min_samples` must be at least 2 for the variance to be defined.
    InvalidMinSamples { value: usize },

    // ---- Fitting ----
    /// Too few non-NaN `(residual, predictor)` pairs remain for a fit.
    InsufficientData { retained: usize, required: usize },

    /// Transformed residuals have zero (or non-finite) variance.
    DegenerateVariance,

    /// A single `(month, location)` fit failed under the abort policy.
    FitFailed { month: usize, location: usize, reason: String },

    // ---- Estimation / optimizer ----
    /// Optimizer failed; include a human-readable status/reason.
    OptimizationFailed { status: String },
}

impl std::error::Error for PTError {}

impl std::fmt::Display for PTError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input/shape validation ----
            PTError::EmptyInput => {
                write!(f, "Input grid is empty.")
            }
            PTError::InvalidAxis { axis } => {
                write!(f, "Axis {axis} does not exist on a (time, location) grid.")
            }
            PTError::IncompleteYears { n_time } => {
                write!(f, "Time axis length {n_time} is not a whole number of years (multiple of 12).")
            }
            PTError::LocationMismatch { residuals, predictor } => {
                write!(
                    f,
                    "Location axis mismatch: residuals have {residuals}, predictor has {predictor}"
                )
            }
            PTError::YearMismatch { expected, actual } => {
                write!(f, "Year axis mismatch: expected {expected} years, predictor has {actual}")
            }
            PTError::CoeffShape { expected, found } => {
                write!(f, "Coefficient grid must have shape {expected:?}; got {found:?}")
            }
            PTError::InvalidCoefficient { month, location, value, reason } => {
                write!(
                    f,
                    "Invalid coefficient at month {month}, location {location}: {value}. {reason}"
                )
            }
            PTError::LengthMismatch { expected, actual } => {
                write!(f, "Length mismatch: expected {expected}, got {actual}")
            }
            // ---- Options ----
            PTError::InvalidMinSamples { value } => {
                write!(f, "min_samples must be at least 2; got: {value}")
            }
            // ---- Fitting ----
            PTError::InsufficientData { retained, required } => {
                write!(f, "Insufficient data: {retained} valid samples retained, {required} required")
            }
            PTError::DegenerateVariance => {
                write!(f, "Transformed residuals have zero or non-finite variance.")
            }
            PTError::FitFailed { month, location, reason } => {
                write!(f, "Fit failed at month {month}, location {location}: {reason}")
            }
            // ---- Estimation / optimizer ----
            PTError::OptimizationFailed { status } => {
                write!(f, "Optimizer failed with status: {status}")
            }
        }
    }
}

/// Convert a [`PTError`] into a Python `ValueError` with the error message.
///
/// This is used at the Rust↔Python boundary to surface domain errors cleanly.
#[cfg(feature = "python-bindings")]
impl std::convert::From<PTError> for PyErr {
    fn from(err: PTError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<OptError> for PTError {
    fn from(err: OptError) -> PTError {
        match err {
            OptError::InsufficientData { retained, required } => {
                PTError::InsufficientData { retained, required }
            }
            OptError::DegenerateVariance => PTError::DegenerateVariance,
            OptError::LengthMismatch { expected, actual } => {
                PTError::LengthMismatch { expected, actual }
            }
            other => PTError::OptimizationFailed { status: other.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Ensure likelihood-level conditions keep their identity when crossing
    // from the optimizer layer back into the domain layer.
    //
    // Given
    // -----
    // - `OptError::DegenerateVariance` and `OptError::InsufficientData`.
    //
    // Expect
    // ------
    // - The matching `PTError` variants with identical payloads.
    fn from_opt_error_preserves_domain_conditions() {
        assert_eq!(PTError::from(OptError::DegenerateVariance), PTError::DegenerateVariance);
        assert_eq!(
            PTError::from(OptError::InsufficientData { retained: 1, required: 2 }),
            PTError::InsufficientData { retained: 1, required: 2 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify that generic optimizer failures become `OptimizationFailed` with
    // the optimizer's message as status.
    //
    // Given
    // -----
    // - `OptError::NonFiniteCost { value: NaN }`.
    //
    // Expect
    // ------
    // - `PTError::OptimizationFailed` whose status mentions the cost.
    fn from_opt_error_wraps_backend_failures() {
        let err = PTError::from(OptError::NonFiniteCost { value: f64::NAN });

        match err {
            PTError::OptimizationFailed { status } => assert!(status.contains("NaN")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
