//! Monthly fitting — one maximum-likelihood fit per `(month, location)`.
//!
//! Purpose
//! -------
//! Estimate the logistic lambda coefficients for every calendar month and
//! location, independently, and collect them into a [`FittedTransform`]
//! together with per-unit diagnostics.
//!
//! Key behaviors
//! -------------
//! - [`fit_unit`] fits a single residual/covariate series: NaN pairs are
//!   dropped, the Nelder–Mead simplex starts at `(1, 0)` inside the box
//!   `[0, ∞) × [−0.1, 0.1]`, and the optimizer outcome is returned as-is.
//! - [`fit_yeo_johnson_transform`] slices the residuals at stride 12 for
//!   each month and fits every location, optionally on the rayon pool.
//!   Results are collected in location order, so the parallel and
//!   sequential paths produce identical output.
//! - Failures follow [`FailurePolicy`]: NaN coefficients plus a warning, or
//!   an early `PTError::FitFailed`.
//! - Non-convergence is recorded in [`FitDiagnostics`], never raised.
//!
//! Invariants & assumptions
//! ------------------------
//! - No state is shared between units; each fit reads only its own column
//!   of the month slice and of the predictor.
//! - The covariate of year `k` is paired with the month-`m` residual of
//!   year `k` (sample `12·k + m`).
use crate::{
    optimization::loglik_optimizer::{OptimOutcome, maximize},
    power_transform::{
        core::{
            data::{LambdaCoefficients, MonthlyResiduals, N_MONTHS, YearlyPredictor},
            lambda::LambdaCoeffs,
            options::{FailurePolicy, FitOptions, INITIAL_GUESS},
            validation::validate_alignment,
        },
        errors::{PTError, PTResult},
        models::{
            likelihood::{FitSample, YeoJohnsonLikelihood},
            transform::{
                PowerTransformResult, inverse_yeo_johnson_transform_series,
                lambdas_from_covariates, yeo_johnson_transform_series,
            },
        },
    },
};
use ndarray::{Array1, Array3, ArrayView1};
use rayon::prelude::*;

/// Result of fitting a single `(month, location)` unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitFit {
    /// Fitted `(ξ₀, ξ₁)`, inside the coefficient box.
    pub coeffs: LambdaCoeffs,
    /// Raw optimizer outcome (log-likelihood, status, counters).
    pub outcome: OptimOutcome,
    /// Number of samples retained after dropping NaN pairs.
    pub n_samples: usize,
}

/// fit_unit — maximum-likelihood fit of one residual/covariate series.
///
/// Parameters
/// ----------
/// - `residuals`: `ArrayView1<f64>`
///   One month of one location, one value per year. NaNs allowed.
/// - `predictor`: `ArrayView1<f64>`
///   Covariate of the same location, one value per year. NaNs allowed.
/// - `opts`: `&FitOptions`
///   Optimizer options and the minimum retained sample count.
///
/// Errors
/// ------
/// - `PTError::LengthMismatch` if the series differ in length.
/// - `PTError::InsufficientData` or `PTError::DegenerateVariance` for
///   ill-posed samples (see [`FitSample::new`]).
/// - `PTError::OptimizationFailed` for optimizer failures.
pub fn fit_unit(
    residuals: ArrayView1<f64>, predictor: ArrayView1<f64>, opts: &FitOptions,
) -> PTResult<UnitFit> {
    let sample = FitSample::new(residuals, predictor, opts.min_samples)?;
    let model = YeoJohnsonLikelihood::new()?;
    let theta0 = Array1::from(INITIAL_GUESS.to_vec());
    let outcome = maximize(&model, theta0, &sample, &opts.mle_opts)?;
    let coeffs = LambdaCoeffs::new(outcome.theta_hat[0], outcome.theta_hat[1]);
    Ok(UnitFit { coeffs, outcome, n_samples: sample.len() })
}

/// Outcome class of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    Converged,
    NotConverged,
    Failed,
}

/// Per-unit diagnostics kept alongside the coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDiagnostics {
    pub status: UnitStatus,
    /// Optimizer termination status, or the failure message.
    pub message: String,
    pub iterations: usize,
    /// `−ℓ(θ̂)`; NaN for failed units.
    pub neg_log_likelihood: f64,
    pub n_samples: usize,
}

impl UnitDiagnostics {
    fn from_fit(fit: &UnitFit) -> Self {
        let status =
            if fit.outcome.converged { UnitStatus::Converged } else { UnitStatus::NotConverged };
        Self {
            status,
            message: fit.outcome.status.clone(),
            iterations: fit.outcome.iterations,
            neg_log_likelihood: -fit.outcome.value,
            n_samples: fit.n_samples,
        }
    }

    fn failed(err: &PTError) -> Self {
        Self {
            status: UnitStatus::Failed,
            message: err.to_string(),
            iterations: 0,
            neg_log_likelihood: f64::NAN,
            n_samples: 0,
        }
    }
}

/// `(month, location)` grid of [`UnitDiagnostics`].
#[derive(Debug, Clone, PartialEq)]
pub struct FitDiagnostics {
    n_locations: usize,
    units: Vec<UnitDiagnostics>,
}

impl FitDiagnostics {
    pub fn get(&self, month: usize, location: usize) -> Option<&UnitDiagnostics> {
        if location >= self.n_locations {
            return None;
        }
        self.units.get(month * self.n_locations + location)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitDiagnostics> {
        self.units.iter()
    }

    pub fn n_failed(&self) -> usize {
        self.count(UnitStatus::Failed)
    }

    pub fn n_not_converged(&self) -> usize {
        self.count(UnitStatus::NotConverged)
    }

    fn count(&self, status: UnitStatus) -> usize {
        self.iter().filter(|u| u.status == status).count()
    }
}

/// FittedTransform — coefficients and diagnostics of a monthly fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedTransform {
    pub coefficients: LambdaCoefficients,
    pub diagnostics: FitDiagnostics,
}

impl FittedTransform {
    /// Forward-transform residuals with these coefficients.
    pub fn transform(
        &self, residuals: &MonthlyResiduals, predictor: &YearlyPredictor,
    ) -> PTResult<PowerTransformResult> {
        yeo_johnson_transform_series(residuals, &self.coefficients, predictor)
    }

    /// Map transformed values back to the original scale.
    pub fn inverse_transform(
        &self, values: &MonthlyResiduals, predictor: &YearlyPredictor,
    ) -> PTResult<PowerTransformResult> {
        inverse_yeo_johnson_transform_series(values, &self.coefficients, predictor)
    }

    /// Lambdas `(month, location, year)` implied for `predictor`.
    pub fn lambda_of(&self, predictor: &YearlyPredictor) -> PTResult<Array3<f64>> {
        lambdas_from_covariates(&self.coefficients, predictor)
    }
}

/// fit_yeo_johnson_transform — fit every `(month, location)` unit.
///
/// Parameters
/// ----------
/// - `residuals`: `&MonthlyResiduals`
///   `(time, location)` residuals covering whole years.
/// - `predictor`: `&YearlyPredictor`
///   `(year, location)` covariates with one row per residual year.
/// - `opts`: `&FitOptions`
///   Optimizer options, failure policy, parallelism, minimum samples.
///
/// Returns
/// -------
/// `PTResult<FittedTransform>` with coefficients of shape
/// `(12, n_locations, 2)` and a diagnostics grid of the same layout.
///
/// Errors
/// ------
/// - `PTError::LocationMismatch` / `PTError::YearMismatch` for misaligned
///   inputs, before any fitting.
/// - `PTError::FitFailed` for the first failing unit (in month, then
///   location order) under [`FailurePolicy::Abort`].
pub fn fit_yeo_johnson_transform(
    residuals: &MonthlyResiduals, predictor: &YearlyPredictor, opts: &FitOptions,
) -> PTResult<FittedTransform> {
    validate_alignment(residuals, predictor)?;
    let n_locations = residuals.n_locations();
    let mut coeffs = Vec::with_capacity(N_MONTHS * n_locations);
    let mut units = Vec::with_capacity(N_MONTHS * n_locations);

    for month in 0..N_MONTHS {
        let monthly = residuals.month_slice(month);
        let fit_location =
            |location: usize| fit_unit(monthly.column(location), predictor.location(location), opts);
        let results: Vec<PTResult<UnitFit>> = if opts.parallel {
            (0..n_locations).into_par_iter().map(fit_location).collect()
        } else {
            (0..n_locations).map(fit_location).collect()
        };

        for (location, result) in results.into_iter().enumerate() {
            match result {
                Ok(fit) => {
                    if !fit.outcome.converged {
                        log::debug!(
                            "month {month}, location {location}: not converged after {} iterations ({})",
                            fit.outcome.iterations,
                            fit.outcome.status
                        );
                    }
                    units.push(UnitDiagnostics::from_fit(&fit));
                    coeffs.push(fit.coeffs);
                }
                Err(err) => match opts.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(PTError::FitFailed { month, location, reason: err.to_string() });
                    }
                    FailurePolicy::PropagateNan => {
                        log::warn!("month {month}, location {location}: fit failed: {err}");
                        units.push(UnitDiagnostics::failed(&err));
                        coeffs.push(LambdaCoeffs::nan());
                    }
                },
            }
        }
        log::debug!("month {month}: fitted {n_locations} locations");
    }

    let coefficients = LambdaCoefficients::from_units(n_locations, &coeffs)?;
    Ok(FittedTransform { coefficients, diagnostics: FitDiagnostics { n_locations, units } })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::{LogLikelihood, MLEOptions};
    use approx::assert_abs_diff_eq;
    use ndarray::{Array, Array2, array};

    fn residual_grid(n_years: usize, n_locations: usize) -> Array2<f64> {
        Array::from_shape_fn((12 * n_years, n_locations), |(t, l)| {
            let k = ((7 * t + 3 * l) % 11) as f64;
            (k / 3.0).exp() - 2.0
        })
    }

    fn predictor_grid(n_years: usize, n_locations: usize) -> Array2<f64> {
        Array::from_shape_fn((n_years, n_locations), |(y, l)| 0.5 * y as f64 + l as f64)
    }

    /// Assert that no single-coordinate step of `±step`, projected into the
    /// coefficient box, improves on the fitted log-likelihood.
    fn assert_locally_optimal(
        residuals: ArrayView1<f64>, predictor: ArrayView1<f64>, fit: &UnitFit, step: f64,
    ) {
        let model = YeoJohnsonLikelihood::new().expect("valid bounds");
        let bounds = model.bounds().expect("likelihood declares bounds");
        let sample = FitSample::new(residuals, predictor, 2).expect("valid sample");
        let theta_hat = array![fit.coeffs.xi0, fit.coeffs.xi1];
        let ll_hat = model.value(&theta_hat, &sample).expect("finite likelihood");
        assert_abs_diff_eq!(ll_hat, fit.outcome.value, epsilon = 1e-12);

        for coord in 0..theta_hat.len() {
            for direction in [-1.0, 1.0] {
                let mut moved = theta_hat.clone();
                moved[coord] += direction * step;
                let moved = bounds.project(&moved);
                if moved == theta_hat {
                    continue;
                }
                let ll_moved = model.value(&moved, &sample).expect("finite likelihood");
                assert!(
                    ll_hat >= ll_moved - 1e-6,
                    "moving coefficient {coord} to {moved} improves {ll_hat} to {ll_moved}"
                );
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure a strongly right-skewed sample is pulled towards `λ < 1` and
    // that the fit never does worse than the identity starting point.
    //
    // Given
    // -----
    // - Right-skewed residuals with a profile optimum near `λ = 0.2`, zero
    //   covariate (so `λ = 2 / (1 + ξ₀)`).
    //
    // Expect
    // ------
    // - `ξ₀ > 1`, `λ̂ ∈ (0.1, 0.35)`, `ξ₁ ∈ [−0.1, 0.1]`, and
    //   `ℓ(θ̂) ≥ ℓ(1, 0)`.
    fn fit_unit_reduces_right_skew() {
        let residuals = array![-0.5, 0.0, 0.3, 0.6, 1.0, 1.5, 2.2, 3.0, 4.2, 6.0];
        let predictor = Array1::zeros(residuals.len());
        let opts = FitOptions::default();

        let fit = fit_unit(residuals.view(), predictor.view(), &opts).expect("fit succeeds");

        let model = YeoJohnsonLikelihood::new().expect("valid bounds");
        let sample = FitSample::new(residuals.view(), predictor.view(), 2).expect("valid sample");
        let ll_start = model.value(&array![1.0, 0.0], &sample).expect("finite likelihood");

        let lambda_hat = 2.0 / (1.0 + fit.coeffs.xi0);
        assert!(fit.coeffs.xi0 > 1.0, "xi0 = {}", fit.coeffs.xi0);
        assert!(lambda_hat > 0.1 && lambda_hat < 0.35, "lambda = {lambda_hat}");
        assert!(fit.coeffs.xi1.abs() <= 0.1);
        assert!(fit.outcome.value >= ll_start);
        assert_eq!(fit.n_samples, 10);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a left-skewed sample, whose optimum lies at `λ > 1` close to the
    // `ξ₀ = 0` edge of the box, is fitted to its interior optimum instead of
    // stalling on the flat `λ = 2` boundary.
    //
    // Given
    // -----
    // - The right-skew sample of `fit_unit_reduces_right_skew` mirrored
    //   through zero, zero covariate.
    //
    // Expect
    // ------
    // - Convergence with `ξ₀ > 0.05` and `λ̂ ∈ (1.65, 1.9)`.
    // - `ℓ(θ̂)` beats the boundary value `ℓ(0, 0)` by a clear margin.
    // - Mirror symmetry with the right-skew fit: equal `ℓ(θ̂)` and
    //   `λ̂_left + λ̂_right ≈ 2`.
    // - No `±1e-2` coefficient step improves `ℓ(θ̂)` for either sample.
    fn fit_unit_recovers_interior_optimum_for_left_skew() {
        let right = array![-0.5, 0.0, 0.3, 0.6, 1.0, 1.5, 2.2, 3.0, 4.2, 6.0];
        let left = right.mapv(|x: f64| -x);
        let predictor = Array1::zeros(left.len());
        let opts = FitOptions::default();

        let left_fit = fit_unit(left.view(), predictor.view(), &opts).expect("fit succeeds");
        let right_fit = fit_unit(right.view(), predictor.view(), &opts).expect("fit succeeds");

        let model = YeoJohnsonLikelihood::new().expect("valid bounds");
        let sample = FitSample::new(left.view(), predictor.view(), 2).expect("valid sample");
        let ll_edge = model.value(&array![0.0, 0.0], &sample).expect("finite likelihood");

        let lambda_left = 2.0 / (1.0 + left_fit.coeffs.xi0);
        let lambda_right = 2.0 / (1.0 + right_fit.coeffs.xi0);
        assert!(left_fit.outcome.converged);
        assert!(left_fit.coeffs.xi0 > 0.05, "xi0 = {}", left_fit.coeffs.xi0);
        assert!(lambda_left > 1.65 && lambda_left < 1.9, "lambda = {lambda_left}");
        assert!(left_fit.outcome.value > ll_edge + 0.05);
        assert_abs_diff_eq!(left_fit.outcome.value, right_fit.outcome.value, epsilon = 1e-6);
        assert_abs_diff_eq!(lambda_left + lambda_right, 2.0, epsilon = 1e-2);

        assert_locally_optimal(left.view(), predictor.view(), &left_fit, 1e-2);
        assert_locally_optimal(right.view(), predictor.view(), &right_fit, 1e-2);
    }

    #[test]
    // Purpose
    // -------
    // Check local optimality of fits whose `ξ₁` ends on a box face, where
    // `ξ₀` must still be optimized along that face.
    //
    // Given
    // -----
    // - The mirrored left-skew sample with covariate `0.3 · i`.
    // - Five residuals `[1, 2, -1, -3, 0]` with covariate
    //   `[0.2, 0.5, 0.9, 1.4, 2.0]`.
    //
    // Expect
    // ------
    // - `ξ₁` on a bound and `ξ₀` strictly positive.
    // - No `±1e-2` coefficient step improves `ℓ(θ̂)`.
    fn fit_unit_is_locally_optimal_on_covariate_bound() {
        let left = array![0.5, 0.0, -0.3, -0.6, -1.0, -1.5, -2.2, -3.0, -4.2, -6.0];
        let ramp = Array1::from_shape_fn(left.len(), |i| 0.3 * i as f64);
        let short = array![1.0, 2.0, -1.0, -3.0, 0.0];
        let short_predictor = array![0.2, 0.5, 0.9, 1.4, 2.0];
        let opts = FitOptions::default();

        let cases = [(left.view(), ramp.view()), (short.view(), short_predictor.view())];
        for (residuals, predictor) in cases {
            let fit = fit_unit(residuals, predictor, &opts).expect("fit succeeds");
            assert_abs_diff_eq!(fit.coeffs.xi1.abs(), 0.1, epsilon = 1e-12);
            assert!(fit.coeffs.xi0 > 0.0, "xi0 = {}", fit.coeffs.xi0);
            assert_locally_optimal(residuals, predictor, &fit, 1e-2);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that NaN pairs excluded from the fit do not change the result,
    // and that repeated fits are bit-for-bit identical.
    //
    // Given
    // -----
    // - A 7-year series and the same series with NaNs inserted on either
    //   side of three extra pairs.
    //
    // Expect
    // ------
    // - Identical coefficients for all three fits.
    fn fit_unit_is_deterministic_and_ignores_nan_pairs() {
        let residuals = array![-1.2, 0.4, 2.5, -0.3, 5.1, 0.9, -2.2];
        let predictor = array![0.0, 0.3, 0.7, 1.1, 1.6, 2.0, 2.4];
        let padded_r = array![-1.2, f64::NAN, 0.4, 2.5, 3.0, -0.3, 5.1, f64::NAN, 0.9, -2.2];
        let padded_y = array![0.0, 9.0, 0.3, 0.7, f64::NAN, 1.1, 1.6, 5.0, 2.0, 2.4];
        let opts = FitOptions::default();

        let first = fit_unit(residuals.view(), predictor.view(), &opts).expect("fit succeeds");
        let second = fit_unit(residuals.view(), predictor.view(), &opts).expect("fit succeeds");
        let padded = fit_unit(padded_r.view(), padded_y.view(), &opts).expect("fit succeeds");

        assert_eq!(first.coeffs, second.coeffs);
        assert_eq!(first.coeffs, padded.coeffs);
        assert_eq!(padded.n_samples, 7);
    }

    #[test]
    // Purpose
    // -------
    // Check the monthly orchestration shape and that the parallel and
    // sequential paths agree exactly.
    //
    // Given
    // -----
    // - 6 years × 3 locations of synthetic residuals and covariates.
    //
    // Expect
    // ------
    // - Coefficients of shape `(12, 3, 2)`, no failed units, identical
    //   output for `parallel = true` and `parallel = false`.
    fn fit_transform_parallel_matches_sequential() {
        let residuals = MonthlyResiduals::new(residual_grid(6, 3)).expect("valid residuals");
        let predictor = YearlyPredictor::new(predictor_grid(6, 3)).expect("valid predictor");
        let parallel = FitOptions::default();
        let sequential =
            FitOptions::new(MLEOptions::default(), FailurePolicy::PropagateNan, false, 2)
                .expect("valid options");

        let par = fit_yeo_johnson_transform(&residuals, &predictor, &parallel)
            .expect("fit succeeds");
        let seq = fit_yeo_johnson_transform(&residuals, &predictor, &sequential)
            .expect("fit succeeds");

        assert_eq!(par.coefficients.as_array().dim(), (12, 3, 2));
        assert_eq!(par.diagnostics.n_failed(), 0);
        assert_eq!(par.coefficients, seq.coefficients);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a location without data yields NaN coefficients under the
    // default policy while neighbours are still fitted, and aborts under
    // `FailurePolicy::Abort`.
    //
    // Given
    // -----
    // - 4 years × 2 locations; location 1 is entirely NaN.
    //
    // Expect
    // ------
    // - Default: location 0 fitted in every month, location 1 NaN with 12
    //   failed diagnostics.
    // - Abort: `FitFailed { month: 0, location: 1, .. }`.
    fn fit_transform_applies_failure_policy() {
        let mut grid = residual_grid(4, 2);
        grid.column_mut(1).fill(f64::NAN);
        let residuals = MonthlyResiduals::new(grid).expect("valid residuals");
        let predictor = YearlyPredictor::new(predictor_grid(4, 2)).expect("valid predictor");

        let fitted = fit_yeo_johnson_transform(&residuals, &predictor, &FitOptions::default())
            .expect("failures are propagated as NaN");
        for month in 0..N_MONTHS {
            assert!(fitted.coefficients.is_fitted(month, 0));
            assert!(!fitted.coefficients.is_fitted(month, 1));
        }
        assert_eq!(fitted.diagnostics.n_failed(), 12);
        let failed = fitted.diagnostics.get(3, 1).expect("unit exists");
        assert_eq!(failed.status, UnitStatus::Failed);
        assert!(failed.neg_log_likelihood.is_nan());

        let abort = FitOptions::new(MLEOptions::default(), FailurePolicy::Abort, true, 2)
            .expect("valid options");
        let err = fit_yeo_johnson_transform(&residuals, &predictor, &abort)
            .expect_err("abort policy stops at the first failure");
        assert!(matches!(err, PTError::FitFailed { month: 0, location: 1, .. }));
    }

    #[test]
    // Purpose
    // -------
    // Confirm misaligned inputs are rejected before any fitting.
    //
    // Given
    // -----
    // - Residuals of 3 years, predictor of 2 years.
    //
    // Expect
    // ------
    // - `YearMismatch { expected: 3, actual: 2 }`.
    fn fit_transform_rejects_year_mismatch() {
        let residuals = MonthlyResiduals::new(residual_grid(3, 1)).expect("valid residuals");
        let predictor = YearlyPredictor::new(predictor_grid(2, 1)).expect("valid predictor");

        let err = fit_yeo_johnson_transform(&residuals, &predictor, &FitOptions::default())
            .expect_err("years must align");

        assert_eq!(err, PTError::YearMismatch { expected: 3, actual: 2 });
    }
}
