//! Validation helpers for log-likelihood optimization.
//!
//! This module centralizes common consistency checks used across the
//! optimizer interface:
//!
//! - **Tolerance checks**: [`verify_sd_tol`] and [`verify_max_iter`] ensure
//!   stopping rules are finite and strictly positive when provided.
//! - **Bounds**: [`validate_bounds`] checks that box constraints are
//!   well-formed.
//! - **Initial guesses**: [`validate_theta0`] enforces length and
//!   finiteness of a starting point.
//! - **Parameter estimates**: [`validate_theta_hat`] ensures a candidate
//!   `theta_hat` exists and contains only finite values.
//! - **Objective values**: [`validate_value`] checks log-likelihood outputs
//!   for finiteness.
//!
//! These helpers standardize error reporting by returning domain-specific
//! [`OptError`] variants, making higher-level code more uniform and easier
//! to debug.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::Theta,
};

/// Validate the optional simplex standard-deviation tolerance.
///
/// - Accepts `None` (no stopping rule on simplex spread).
/// - If `Some`, the value must be **finite** and **strictly positive**.
///
/// # Errors
/// Returns [`OptError::InvalidSdTol`] if the value is non-finite or ≤ 0.0.
pub fn verify_sd_tol(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidSdTol { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidSdTol { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional iteration cap.
///
/// # Errors
/// Returns [`OptError::InvalidMaxIter`] if `max_iter == Some(0)`.
pub fn verify_max_iter(max_iter: Option<usize>) -> OptResult<()> {
    if let Some(max_iter) = max_iter {
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
    }
    Ok(())
}

/// Validate a pair of lower/upper bound vectors.
///
/// Infinite bounds are allowed (a half-open or unbounded coordinate); NaN
/// bounds and inverted pairs are not.
///
/// # Errors
/// - [`OptError::BoundsLengthMismatch`] if the vectors differ in length.
/// - [`OptError::InvalidBounds`] for the first NaN or inverted pair.
pub fn validate_bounds(lower: &[f64], upper: &[f64]) -> OptResult<()> {
    if lower.len() != upper.len() {
        return Err(OptError::BoundsLengthMismatch { lower: lower.len(), upper: upper.len() });
    }
    for (index, (&lo, &hi)) in lower.iter().zip(upper.iter()).enumerate() {
        if lo.is_nan() || hi.is_nan() {
            return Err(OptError::InvalidBounds {
                index,
                lower: lo,
                upper: hi,
                reason: "Bounds must not be NaN.",
            });
        }
        if lo > hi {
            return Err(OptError::InvalidBounds {
                index,
                lower: lo,
                upper: hi,
                reason: "Lower bound must not exceed upper bound.",
            });
        }
    }
    Ok(())
}

/// Validate an initial parameter vector against an expected dimension.
///
/// # Errors
/// - [`OptError::ThetaLengthMismatch`] if `theta.len() != dim`.
/// - [`OptError::InvalidThetaInput`] for the first non-finite entry.
pub fn validate_theta0(theta: &Theta, dim: usize) -> OptResult<()> {
    if theta.len() != dim {
        return Err(OptError::ThetaLengthMismatch { expected: dim, actual: theta.len() });
    }
    for (index, &value) in theta.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidThetaInput { index, value });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated parameter vector (`theta_hat`).
///
/// Accepts only a present vector with all **finite** entries.
///
/// # Returns
/// The owned `Theta` if valid.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Parameter estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}

/// Validate that a scalar log-likelihood value is finite.
///
/// Negative values are fine as long as they are finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}
