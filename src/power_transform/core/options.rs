//! Fit options — configuration for the monthly maximum-likelihood fits.
//!
//! Purpose
//! -------
//! Collect the knobs that control how each `(month, location)` unit is fit
//! and how failures are handled, so call sites pass one validated value
//! instead of ad-hoc flags.
//!
//! Key behaviors
//! -------------
//! - [`FitOptions`] bundles optimizer options ([`MLEOptions`]), the
//!   [`FailurePolicy`], whether locations run on the rayon pool, and the
//!   minimum number of retained samples per unit.
//! - Fixed fitting constants (initial guess, coefficient bounds) live here
//!   as well.
//!
//! Invariants & assumptions
//! ------------------------
//! - `min_samples ≥ 2`, otherwise the sample variance of the transformed
//!   residuals is not informative.
//! - `MLEOptions` has already been validated by its own constructors.
use crate::{
    optimization::loglik_optimizer::MLEOptions,
    power_transform::errors::{PTError, PTResult},
};

/// Starting point `(ξ₀, ξ₁)`; gives `λ = 1` (identity) at any covariate.
pub const INITIAL_GUESS: [f64; 2] = [1.0, 0.0];

/// Lower bounds on `(ξ₀, ξ₁)`.
pub const LOWER_BOUNDS: [f64; 2] = [0.0, -0.1];

/// Upper bounds on `(ξ₀, ξ₁)`.
pub const UPPER_BOUNDS: [f64; 2] = [f64::INFINITY, 0.1];

/// Default minimum number of retained samples per unit.
pub const DEFAULT_MIN_SAMPLES: usize = 2;

/// What to do when a single `(month, location)` fit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Store `[NaN, NaN]` for the unit, log a warning, and keep going.
    #[default]
    PropagateNan,
    /// Stop at the first failure and return `PTError::FitFailed`.
    Abort,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nan" | "propagate_nan" => Ok(FailurePolicy::PropagateNan),
            "abort" | "raise" => Ok(FailurePolicy::Abort),
            other => Err(format!(
                "invalid failure policy {other:?} (expected 'propagate_nan' or 'abort')"
            )),
        }
    }
}

/// FitOptions — estimation-time configuration for the power transform.
///
/// Fields
/// ------
/// - `mle_opts`: [`MLEOptions`]
///   Stopping rule, iteration cap, and verbosity of each Nelder–Mead run.
/// - `failure_policy`: [`FailurePolicy`]
///   Whether a failing unit yields NaN coefficients or aborts the batch.
/// - `parallel`: `bool`
///   Fit the locations of each month on the rayon pool.
/// - `min_samples`: `usize`
///   Minimum non-NaN `(residual, predictor)` pairs a unit must retain.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub mle_opts: MLEOptions,
    pub failure_policy: FailurePolicy,
    pub parallel: bool,
    pub min_samples: usize,
}

impl FitOptions {
    /// Construct validated fit options.
    ///
    /// Errors
    /// ------
    /// - `PTError::InvalidMinSamples` if `min_samples < 2`.
    pub fn new(
        mle_opts: MLEOptions, failure_policy: FailurePolicy, parallel: bool, min_samples: usize,
    ) -> PTResult<Self> {
        if min_samples < DEFAULT_MIN_SAMPLES {
            return Err(PTError::InvalidMinSamples { value: min_samples });
        }
        Ok(Self { mle_opts, failure_policy, parallel, min_samples })
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            mle_opts: MLEOptions::default(),
            failure_policy: FailurePolicy::default(),
            parallel: true,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}
