//! Logistic lambda model.
//!
//! Maps a coefficient pair `(ξ₀, ξ₁)` and a yearly covariate `y` to the
//! power-transform exponent
//!
//! ```text
//! λ(y) = 2 / (1 + ξ₀ · exp(ξ₁ · y))
//! ```
//!
//! For `ξ₀ > 0` and finite `y`, `ξ₁` the result lies strictly inside
//! `(0, 2)`. `ξ₀ = 0` yields exactly `2`; NaN coefficients (failed fits)
//! yield NaN lambdas.
use crate::power_transform::errors::{PTError, PTResult};
use ndarray::{Array1, ArrayView1, ArrayViewMut1, Zip};

/// Coefficient pair `(ξ₀, ξ₁)` of the logistic lambda model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambdaCoeffs {
    /// Intercept-like scale, `ξ₀ ≥ 0`.
    pub xi0: f64,
    /// Covariate slope, `ξ₁ ∈ [-0.1, 0.1]` for fitted coefficients.
    pub xi1: f64,
}

impl LambdaCoeffs {
    pub fn new(xi0: f64, xi1: f64) -> Self {
        Self { xi0, xi1 }
    }

    /// Sentinel pair used for units whose fit failed.
    pub fn nan() -> Self {
        Self { xi0: f64::NAN, xi1: f64::NAN }
    }

    pub fn is_nan(&self) -> bool {
        self.xi0.is_nan() || self.xi1.is_nan()
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.xi0, self.xi1]
    }
}

/// Evaluate `λ(y)` for a single covariate value.
#[inline]
pub fn lambda_function(coeffs: LambdaCoeffs, covariate: f64) -> f64 {
    2.0 / (1.0 + coeffs.xi0 * (coeffs.xi1 * covariate).exp())
}

/// Evaluate `λ(y)` element-wise over a covariate vector.
pub fn lambda_function_array(coeffs: LambdaCoeffs, covariate: ArrayView1<f64>) -> Array1<f64> {
    covariate.mapv(|y| lambda_function(coeffs, y))
}

/// Evaluate `λ(y)` element-wise into a caller-provided buffer.
///
/// Errors
/// ------
/// - `PTError::LengthMismatch` if `out` differs in length from `covariate`.
pub fn lambda_function_into(
    coeffs: LambdaCoeffs, covariate: ArrayView1<f64>, mut out: ArrayViewMut1<f64>,
) -> PTResult<()> {
    if out.len() != covariate.len() {
        return Err(PTError::LengthMismatch { expected: covariate.len(), actual: out.len() });
    }
    Zip::from(&mut out).and(&covariate).for_each(|o, &y| *o = lambda_function(coeffs, y));
    Ok(())
}
