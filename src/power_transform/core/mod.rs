//! power_transform::core — building blocks of the covariate-dependent
//! Yeo–Johnson transform.
//!
//! Purpose
//! -------
//! Provide the numerical kernels and validated containers that the fitting
//! and transform orchestration in [`models`](crate::power_transform::models)
//! are built from.
//!
//! Key behaviors
//! -------------
//! - [`lambda`]: logistic map from `(ξ₀, ξ₁)` and a covariate to `λ ∈ (0, 2)`.
//! - [`kernels`]: forward and inverse transforms with per-element lambdas,
//!   plus the [`kernels::PreparedSample`] cache for the likelihood loop.
//! - [`data`]: `(time, location)` residuals, `(year, location)` predictors,
//!   `(month, location, coeff)` coefficients.
//! - [`options`]: [`options::FitOptions`] and [`options::FailurePolicy`].
//! - [`validation`]: cross-input shape checks and pairwise NaN filtering.
//!
//! Conventions
//! -----------
//! - Time index `t = 12·year + month`, months `0..12`.
//! - All numerical code works on `f64` and propagates NaN rather than
//!   panicking.

pub mod data;
pub mod kernels;
pub mod lambda;
pub mod options;
pub mod validation;
