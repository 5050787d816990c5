//! Profile log-likelihood of the covariate-dependent Yeo–Johnson transform.
//!
//! For one `(month, location)` unit with retained residuals `r` and yearly
//! covariates `y`, and `λᵢ = 2 / (1 + ξ₀·exp(ξ₁·yᵢ))`:
//!
//! ```text
//! ℓ(ξ) = −(n/2)·ln var(T(r, λ)) + Σ (λᵢ − 1)·sign(rᵢ)·log1p|rᵢ|
//! ```
//!
//! with the variance taken with `ddof = 0`. The optimizer maximizes `ℓ`
//! over `ξ₀ ∈ [0, ∞)`, `ξ₁ ∈ [−0.1, 0.1]`.
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Bounds, LogLikelihood, Theta},
    },
    power_transform::{
        core::{
            data::N_COEFFS,
            kernels::PreparedSample,
            lambda::{LambdaCoeffs, lambda_function_into},
            options::{LOWER_BOUNDS, UPPER_BOUNDS},
            validation::drop_nan_pairs,
        },
        errors::{PTError, PTResult},
    },
};
use ndarray::{Array1, ArrayView1};
use std::cell::RefCell;

/// FitSample — NaN-free residual/covariate pairs of one fitting unit.
///
/// Residual logarithms are cached in a [`PreparedSample`] so likelihood
/// evaluations only pay for the exponentials. The sample also owns the
/// buffers the likelihood writes lambdas and transformed values into, so
/// optimizer iterations run allocation-free.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSample {
    sample: PreparedSample,
    predictor: Array1<f64>,
    scratch: YJScratch,
}

/// Per-sample workspace reused across likelihood evaluations.
///
/// Both buffers have the retained sample length and are overwritten in
/// full by every evaluation.
#[derive(Debug, Clone, PartialEq)]
struct YJScratch {
    lambda_buf: RefCell<Array1<f64>>,
    transformed_buf: RefCell<Array1<f64>>,
}

impl YJScratch {
    fn new(n: usize) -> Self {
        Self {
            lambda_buf: RefCell::new(Array1::zeros(n)),
            transformed_buf: RefCell::new(Array1::zeros(n)),
        }
    }
}

impl FitSample {
    /// Build a fitting sample, dropping NaN pairs.
    ///
    /// Errors
    /// ------
    /// - `PTError::LengthMismatch` if the series differ in length.
    /// - `PTError::InsufficientData` if fewer than `min_samples` pairs remain.
    /// - `PTError::DegenerateVariance` if all retained residuals are equal, in
    ///   which case every transform has zero variance.
    pub fn new(
        residuals: ArrayView1<f64>, predictor: ArrayView1<f64>, min_samples: usize,
    ) -> PTResult<Self> {
        let (residuals, predictor) = drop_nan_pairs(residuals, predictor)?;
        if residuals.len() < min_samples {
            return Err(PTError::InsufficientData {
                retained: residuals.len(),
                required: min_samples,
            });
        }
        let first = residuals[0];
        if residuals.iter().all(|&r| r == first) {
            return Err(PTError::DegenerateVariance);
        }
        let scratch = YJScratch::new(residuals.len());
        Ok(Self { sample: PreparedSample::new(residuals.view()), predictor, scratch })
    }

    pub fn len(&self) -> usize {
        self.sample.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }

    pub fn predictor(&self) -> ArrayView1<'_, f64> {
        self.predictor.view()
    }
}

/// YeoJohnsonLikelihood — `LogLikelihood` over `θ = [ξ₀, ξ₁]`.
#[derive(Debug, Clone, PartialEq)]
pub struct YeoJohnsonLikelihood {
    bounds: Bounds,
}

impl YeoJohnsonLikelihood {
    pub fn new() -> PTResult<Self> {
        let bounds = Bounds::new(LOWER_BOUNDS.to_vec(), UPPER_BOUNDS.to_vec())?;
        Ok(Self { bounds })
    }

    fn coeffs(theta: &Theta) -> OptResult<LambdaCoeffs> {
        if theta.len() != N_COEFFS {
            return Err(OptError::ThetaLengthMismatch { expected: N_COEFFS, actual: theta.len() });
        }
        Ok(LambdaCoeffs::new(theta[0], theta[1]))
    }
}

impl LogLikelihood for YeoJohnsonLikelihood {
    type Data = FitSample;

    fn value(&self, theta: &Theta, data: &FitSample) -> OptResult<f64> {
        let coeffs = Self::coeffs(theta)?;
        let mut lambdas = data.scratch.lambda_buf.borrow_mut();
        let mut transformed = data.scratch.transformed_buf.borrow_mut();
        lambda_function_into(coeffs, data.predictor(), lambdas.view_mut())?;
        data.sample.transform_into(lambdas.view(), transformed.view_mut())?;
        let variance = transformed.var(0.0);
        if !variance.is_finite() || variance <= 0.0 {
            return Err(OptError::DegenerateVariance);
        }
        let n = data.len() as f64;
        let log_jacobian = data.sample.log_jacobian(lambdas.view())?;
        Ok(-0.5 * n * variance.ln() + log_jacobian)
    }

    fn check(&self, theta: &Theta, data: &FitSample) -> OptResult<()> {
        if theta.len() != N_COEFFS {
            return Err(OptError::ThetaLengthMismatch { expected: N_COEFFS, actual: theta.len() });
        }
        if data.len() < 2 {
            return Err(OptError::InsufficientData { retained: data.len(), required: 2 });
        }
        Ok(())
    }

    fn bounds(&self) -> Option<&Bounds> {
        Some(&self.bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Check the log-likelihood at the identity point against a hand
    // computation: with `λ = 1` the Jacobian vanishes and `T(r) = r`.
    //
    // Given
    // -----
    // - `r = [1, 2, -1, -3, 0]`, `y = 0`, `θ = (1, 0)`.
    //
    // Expect
    // ------
    // - `ℓ = −(5/2)·ln var(r)` with `var(r) = 2.96` (ddof 0).
    fn value_at_identity_is_gaussian_profile() {
        let sample = FitSample::new(
            array![1.0, 2.0, -1.0, -3.0, 0.0].view(),
            Array1::zeros(5).view(),
            2,
        )
        .expect("valid sample");
        let model = YeoJohnsonLikelihood::new().expect("valid bounds");

        let ll = model.value(&array![1.0, 0.0], &sample).expect("finite likelihood");

        assert_relative_eq!(ll, -2.5 * 2.96_f64.ln(), max_relative = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Ensure reusing the sample's buffers does not leak state between
    // evaluations at different coefficients.
    //
    // Given
    // -----
    // - `r = [1, 2, -1, -3, 0]`, `y = [0.2, 0.5, 0.9, 1.4, 2.0]`.
    // - Evaluations at `θ_a = (2, 0.1)`, then `θ_b = (0.5, -0.1)`, then
    //   `θ_a` again, plus `θ_b` on a freshly built sample.
    //
    // Expect
    // ------
    // - Bit-identical values for repeated `θ_a` and for `θ_b` on both
    //   samples, and distinct values for `θ_a` and `θ_b`.
    fn value_is_stable_across_repeated_evaluations() {
        let residuals = array![1.0, 2.0, -1.0, -3.0, 0.0];
        let predictor = array![0.2, 0.5, 0.9, 1.4, 2.0];
        let reused = FitSample::new(residuals.view(), predictor.view(), 2).expect("valid sample");
        let fresh = FitSample::new(residuals.view(), predictor.view(), 2).expect("valid sample");
        let model = YeoJohnsonLikelihood::new().expect("valid bounds");
        let (theta_a, theta_b) = (array![2.0, 0.1], array![0.5, -0.1]);

        let first = model.value(&theta_a, &reused).expect("finite likelihood");
        let other = model.value(&theta_b, &reused).expect("finite likelihood");
        let again = model.value(&theta_a, &reused).expect("finite likelihood");

        assert_eq!(first, again);
        assert_eq!(other, model.value(&theta_b, &fresh).expect("finite likelihood"));
        assert!(first != other);
    }

    #[test]
    // Purpose
    // -------
    // Ensure sample construction drops NaN pairs and guards the degenerate
    // cases before any optimization happens.
    //
    // Given
    // -----
    // - `r = [NaN, 1, 2]` with `y = [0, NaN, 0]` (one pair survives).
    // - `r = [1, 1, 1]` with finite `y`.
    //
    // Expect
    // ------
    // - `InsufficientData { retained: 1, required: 2 }`.
    // - `DegenerateVariance`.
    fn fit_sample_guards_insufficient_and_constant_data() {
        assert_eq!(
            FitSample::new(
                array![f64::NAN, 1.0, 2.0].view(),
                array![0.0, f64::NAN, 0.0].view(),
                2
            ),
            Err(PTError::InsufficientData { retained: 1, required: 2 })
        );
        assert_eq!(
            FitSample::new(array![1.0, 1.0, 1.0].view(), array![0.0, 1.0, 2.0].view(), 2),
            Err(PTError::DegenerateVariance)
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify the model declares the fixed coefficient box.
    //
    // Given
    // -----
    // - `YeoJohnsonLikelihood::new()`.
    //
    // Expect
    // ------
    // - Bounds `[0, ∞) × [−0.1, 0.1]`.
    fn likelihood_declares_coefficient_bounds() {
        let model = YeoJohnsonLikelihood::new().expect("valid bounds");
        let bounds = model.bounds().expect("bounded model");

        assert_eq!(bounds.lower(), &[0.0, -0.1]);
        assert_eq!(bounds.upper(), &[f64::INFINITY, 0.1]);
    }
}
