//! power_transform — covariate-dependent Yeo–Johnson power transform.
//!
//! Purpose
//! -------
//! Normalize skewed monthly residuals with a Yeo–Johnson transform whose
//! exponent `λ` depends on a yearly covariate through a logistic curve,
//! `λ = 2 / (1 + ξ₀·exp(ξ₁·y))`. The coefficients `(ξ₀, ξ₁)` are fit by
//! maximum likelihood independently for every calendar month and location.
//!
//! Key behaviors
//! -------------
//! - [`fit_yeo_johnson_transform`]: residuals `(time, location)` + yearly
//!   predictor `(year, location)` → coefficients `(month, location, coeff)`
//!   plus diagnostics.
//! - [`yeo_johnson_transform_series`] / [`inverse_yeo_johnson_transform_series`]:
//!   apply or undo the transform with fitted coefficients, returning values
//!   and the lambdas used.
//! - [`lambda_of`]: evaluate lambdas on their own.
//!
//! Invariants & assumptions
//! ------------------------
//! - `λ ∈ (0, 2)` for finite coefficients with `ξ₀ > 0`.
//! - The transform preserves sign and maps `0` to `0`.
//! - Fits never share data across months or locations.
//!
//! Conventions
//! -----------
//! - Errors are reported as [`errors::PTError`]; failed units surface as NaN
//!   coefficients unless [`FailurePolicy::Abort`] is selected.

pub mod core;
pub mod errors;
pub mod models;

pub use self::core::{
    data::{LambdaCoefficients, MonthlyResiduals, YearlyPredictor},
    lambda::{LambdaCoeffs, lambda_function},
    options::{FailurePolicy, FitOptions},
};
pub use self::models::{
    monthly::{FitDiagnostics, FittedTransform, UnitFit, fit_unit, fit_yeo_johnson_transform},
    transform::{
        PowerTransformResult, inverse_yeo_johnson_transform_series, lambda_of,
        lambdas_from_covariates, yeo_johnson_transform_series,
    },
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_yeojohnson::power_transform::prelude::*;
//
// to import the main power-transform surface in a single line.

pub mod prelude {
    pub use super::errors::{PTError, PTResult};
    pub use super::{
        FailurePolicy, FitOptions, FittedTransform, LambdaCoefficients, MonthlyResiduals,
        PowerTransformResult, YearlyPredictor, fit_yeo_johnson_transform,
        inverse_yeo_johnson_transform_series, lambda_of, yeo_johnson_transform_series,
    };
}
