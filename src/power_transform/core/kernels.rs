//! Yeo–Johnson kernels with per-element lambdas.
//!
//! Purpose
//! -------
//! Provide the forward transform, its closed-form inverse, and a cached
//! sample representation used inside the likelihood's inner loop.
//!
//! Key behaviors
//! -------------
//! - Forward: for `x ≥ 0` the effective exponent is `λ`, for `x < 0` it is
//!   `2 − λ`. When `|exponent| ≤ ε` the magnitude is `log1p|x|`, otherwise
//!   `expm1(log1p|x| · exponent) / exponent`. The sign of `x` is copied onto
//!   the result, so `T(0, λ) = 0` and `sign(T(x, λ)) = sign(x)`.
//! - Inverse: four disjoint branches on the sign of the transformed value and
//!   on `λ ≈ 0` (non-negative side) or `λ ≈ 2` (negative side).
//! - [`PreparedSample`] computes `log1p|x|` and the signed log-Jacobian terms
//!   once, so repeated evaluations for varying lambdas never recompute the
//!   logarithm.
//!
//! Invariants & assumptions
//! ------------------------
//! - `ε` is `f64::EPSILON`. The forward kernel treats `|exponent| ≤ ε` as
//!   singular; the inverse treats `|λ| < ε` and `|λ − 2| ≤ ε` as singular.
//! - NaN inputs or NaN lambdas produce NaN outputs; nothing panics.
//!
//! Testing notes
//! -------------
//! - Unit tests cover sign preservation, identity at `λ = 1`, continuity at
//!   the singular branches, round-trips over a grid, and NaN propagation.
use crate::power_transform::errors::{PTError, PTResult};
use ndarray::{Array1, ArrayView1, ArrayViewMut1, Zip};

/// Forward Yeo–Johnson transform of one value given `log1p|x|`.
#[inline]
fn forward_from_log1p(x: f64, log1p_abs: f64, lambda: f64) -> f64 {
    let exponent = if x >= 0.0 { lambda } else { 2.0 - lambda };
    let magnitude = if exponent.abs() <= f64::EPSILON {
        log1p_abs
    } else {
        (log1p_abs * exponent).exp_m1() / exponent
    };
    magnitude.copysign(x)
}

/// Forward Yeo–Johnson transform of a single value.
#[inline]
pub fn yeo_johnson_scalar(x: f64, lambda: f64) -> f64 {
    forward_from_log1p(x, x.abs().ln_1p(), lambda)
}

/// Inverse Yeo–Johnson transform of a single value.
#[inline]
pub fn inverse_yeo_johnson_scalar(x: f64, lambda: f64) -> f64 {
    if x >= 0.0 {
        if lambda.abs() < f64::EPSILON {
            x.exp_m1()
        } else {
            ((x * lambda).ln_1p() / lambda).exp_m1()
        }
    } else if (lambda - 2.0).abs() > f64::EPSILON {
        let exponent = 2.0 - lambda;
        -((-exponent * x).ln_1p() / exponent).exp_m1()
    } else {
        -(-x).exp_m1()
    }
}

fn check_lengths(data: &ArrayView1<f64>, lambdas: &ArrayView1<f64>) -> PTResult<()> {
    if data.len() != lambdas.len() {
        return Err(PTError::LengthMismatch { expected: data.len(), actual: lambdas.len() });
    }
    Ok(())
}

/// yeo_johnson_transform — forward transform with one lambda per element.
///
/// Errors
/// ------
/// - `PTError::LengthMismatch` if `lambdas.len() != data.len()`.
pub fn yeo_johnson_transform(
    data: ArrayView1<f64>, lambdas: ArrayView1<f64>,
) -> PTResult<Array1<f64>> {
    check_lengths(&data, &lambdas)?;
    let mut out = Array1::zeros(data.len());
    Zip::from(&mut out).and(&data).and(&lambdas).for_each(|o, &x, &lambda| {
        *o = yeo_johnson_scalar(x, lambda);
    });
    Ok(out)
}

/// yeo_johnson_inverse_transform — inverse transform with one lambda per
/// element.
///
/// Errors
/// ------
/// - `PTError::LengthMismatch` if `lambdas.len() != data.len()`.
pub fn yeo_johnson_inverse_transform(
    data: ArrayView1<f64>, lambdas: ArrayView1<f64>,
) -> PTResult<Array1<f64>> {
    check_lengths(&data, &lambdas)?;
    let mut out = Array1::zeros(data.len());
    Zip::from(&mut out).and(&data).and(&lambdas).for_each(|o, &x, &lambda| {
        *o = inverse_yeo_johnson_scalar(x, lambda);
    });
    Ok(out)
}

/// PreparedSample — residuals with their logarithms precomputed.
///
/// Holds `x`, `log1p|x|`, and `sign(x) · log1p|x|` for one fitting unit.
/// Built once per fit and shared read-only across every likelihood
/// evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSample {
    data: Array1<f64>,
    log1p_abs: Array1<f64>,
    signed_log1p: Array1<f64>,
    signed_log1p_sum: f64,
}

impl PreparedSample {
    pub fn new(data: ArrayView1<f64>) -> Self {
        let data = data.to_owned();
        let log1p_abs = data.mapv(|x| x.abs().ln_1p());
        let signed_log1p = Zip::from(&data).and(&log1p_abs).map_collect(|&x, &l| {
            if x > 0.0 {
                l
            } else if x < 0.0 {
                -l
            } else {
                0.0
            }
        });
        let signed_log1p_sum = signed_log1p.sum();
        Self { data, log1p_abs, signed_log1p, signed_log1p_sum }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Forward transform into a caller-provided buffer.
    ///
    /// Errors
    /// ------
    /// - `PTError::LengthMismatch` if `lambdas` or `out` differ in length
    ///   from the sample.
    pub fn transform_into(
        &self, lambdas: ArrayView1<f64>, mut out: ArrayViewMut1<f64>,
    ) -> PTResult<()> {
        check_lengths(&self.data.view(), &lambdas)?;
        if out.len() != self.len() {
            return Err(PTError::LengthMismatch { expected: self.len(), actual: out.len() });
        }
        Zip::from(&mut out).and(&self.data).and(&self.log1p_abs).and(&lambdas).for_each(
            |o, &x, &l, &lambda| {
                *o = forward_from_log1p(x, l, lambda);
            },
        );
        Ok(())
    }

    /// Log-Jacobian of the transform, `Σ (λᵢ − 1) · sign(xᵢ) · log1p|xᵢ|`.
    pub fn log_jacobian(&self, lambdas: ArrayView1<f64>) -> PTResult<f64> {
        check_lengths(&self.data.view(), &lambdas)?;
        Ok(self.signed_log1p.dot(&lambdas) - self.signed_log1p_sum)
    }
}
