//! Integration tests for the monthly Yeo–Johnson power-transform pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: from validated residual and
//!   predictor grids, through per-`(month, location)` maximum-likelihood
//!   fitting, to the forward transform and its inverse.
//! - Exercise the public surface the way a downstream caller would, using
//!   only items re-exported from `power_transform`.
//!
//! Coverage
//! --------
//! - `power_transform::core::data`:
//!   - `MonthlyResiduals` / `YearlyPredictor` construction in both the
//!     `(time, location)` and `(location, time)` layouts.
//! - `power_transform::models::monthly`:
//!   - `fit_yeo_johnson_transform` with sequential and parallel execution,
//!     diagnostics, and both failure policies.
//! - `power_transform::models::transform`:
//!   - Forward and inverse series transforms and lambda evaluation.
//!
//! Exclusions
//! ----------
//! - Scalar kernel branches, likelihood formulas, and optimizer internals;
//!   these are covered by unit tests next to the code.
//! - Python bindings, which need an interpreter and are tested from Python.
use approx::assert_abs_diff_eq;
use ndarray::{Array, Array2, Axis, array};
use rust_yeojohnson::{
    optimization::loglik_optimizer::MLEOptions,
    power_transform::{
        FailurePolicy, FitOptions, LambdaCoefficients, MonthlyResiduals, YearlyPredictor,
        errors::PTError,
        fit_yeo_johnson_transform, inverse_yeo_johnson_transform_series, lambda_of,
        models::monthly::UnitStatus,
        yeo_johnson_transform_series,
    },
};

const YEARLY_RESIDUALS: [f64; 5] = [1.0, 2.0, -1.0, -3.0, 0.0];
const YEARLY_PREDICTOR: [f64; 5] = [0.2, 0.5, 0.9, 1.4, 2.0];

/// Purpose
/// -------
/// Build a five-year `(time, location)` residual grid in which every
/// calendar month of location `l` sees the yearly sequence
/// `YEARLY_RESIDUALS` scaled by `1 + l`.
///
/// Returns
/// -------
/// - An `Array2<f64>` of shape `(60, n_locations)`.
fn scenario_residuals(n_locations: usize) -> Array2<f64> {
    Array::from_shape_fn((12 * YEARLY_RESIDUALS.len(), n_locations), |(t, l)| {
        YEARLY_RESIDUALS[t / 12] * (1.0 + l as f64)
    })
}

/// Purpose
/// -------
/// Build the matching `(year, location)` predictor grid; every location
/// shares `YEARLY_PREDICTOR`.
fn scenario_predictor(n_locations: usize) -> Array2<f64> {
    Array::from_shape_fn((YEARLY_PREDICTOR.len(), n_locations), |(y, _)| YEARLY_PREDICTOR[y])
}

fn sequential_options(failure_policy: FailurePolicy) -> FitOptions {
    FitOptions::new(MLEOptions::default(), failure_policy, false, 2)
        .expect("options should be valid")
}

#[test]
// Purpose
// -------
// Run the full pipeline on a single location and check the fitted
// coefficients, the implied lambdas, and the transform round trip.
//
// Given
// -----
// - Five years of monthly residuals `[1, 2, -1, -3, 0]` per month and the
//   covariate `[0.2, 0.5, 0.9, 1.4, 2.0]`.
// - Default fit options.
//
// Expect
// ------
// - No failed units; `ξ₀ ≥ 0` and `ξ₁ ∈ [−0.1, 0.1]` everywhere.
// - Every lambda lies strictly inside `(0, 2)`, and the standalone
//   `lambda_of` agrees with the fitted transform's.
// - Identical data in every month yields identical coefficients.
// - The transform preserves sign, maps `0` to `0`, and the inverse
//   recovers the input within `1e-6`.
fn fit_transform_inverse_recovers_residuals() {
    let residuals = MonthlyResiduals::new(scenario_residuals(1)).expect("valid residuals");
    let predictor = YearlyPredictor::new(scenario_predictor(1)).expect("valid predictor");

    let fitted = fit_yeo_johnson_transform(&residuals, &predictor, &FitOptions::default())
        .expect("fit should succeed");

    assert_eq!(fitted.diagnostics.n_failed(), 0);
    for month in 0..12 {
        let xi0 = fitted.coefficients.xi0(month, 0);
        let xi1 = fitted.coefficients.xi1(month, 0);
        assert!(xi0.is_finite() && xi0 >= 0.0, "xi0 = {xi0}");
        assert!(xi1.abs() <= 0.1, "xi1 = {xi1}");
        assert_eq!(fitted.coefficients.coeffs(month, 0), fitted.coefficients.coeffs(0, 0));
    }

    let lambdas = fitted.lambda_of(&predictor).expect("lambdas should evaluate");
    assert_eq!(lambdas.dim(), (12, 1, 5));
    assert!(lambdas.iter().all(|&lambda| lambda > 0.0 && lambda < 2.0));
    assert_eq!(lambda_of(&fitted.coefficients, &predictor).expect("lambdas"), lambdas);

    let forward = fitted.transform(&residuals, &predictor).expect("transform should succeed");
    assert_eq!(forward.lambdas, lambdas);
    for (&x, &t) in residuals.view().iter().zip(forward.values.iter()) {
        if x == 0.0 {
            assert_eq!(t, 0.0);
        } else {
            assert_eq!(x.signum(), t.signum());
        }
    }

    let transformed = MonthlyResiduals::new(forward.values).expect("valid transformed grid");
    let back = fitted.inverse_transform(&transformed, &predictor).expect("inverse should succeed");
    for (&original, &recovered) in residuals.view().iter().zip(back.values.iter()) {
        assert_abs_diff_eq!(original, recovered, epsilon = 1e-6);
    }
}

#[test]
// Purpose
// -------
// Ensure the `(location, time)` layout and the parallel path produce the
// same coefficients as the `(time, location)` layout fitted sequentially.
//
// Given
// -----
// - Three locations of the scenario grid, once as `(time, location)`
//   fitted sequentially and once transposed to `(location, time)` (with a
//   `(location, year)` predictor) fitted in parallel.
//
// Expect
// ------
// - Bit-identical coefficient arrays.
fn location_major_layout_and_parallel_fit_agree() {
    let n_locations = 3;
    let residuals = MonthlyResiduals::new(scenario_residuals(n_locations)).expect("valid");
    let predictor = YearlyPredictor::new(scenario_predictor(n_locations)).expect("valid");
    let transposed_residuals =
        MonthlyResiduals::from_axis(scenario_residuals(n_locations).reversed_axes(), Axis(1))
            .expect("valid");
    let transposed_predictor =
        YearlyPredictor::from_axis(scenario_predictor(n_locations).reversed_axes(), Axis(1))
            .expect("valid");

    let sequential = fit_yeo_johnson_transform(
        &residuals,
        &predictor,
        &sequential_options(FailurePolicy::PropagateNan),
    )
    .expect("sequential fit should succeed");
    let parallel = fit_yeo_johnson_transform(
        &transposed_residuals,
        &transposed_predictor,
        &FitOptions::default(),
    )
    .expect("parallel fit should succeed");

    assert_eq!(transposed_residuals.view(), residuals.view());
    assert_eq!(sequential.coefficients, parallel.coefficients);
}

#[test]
// Purpose
// -------
// Check both failure policies end to end on a grid with one location
// whose residuals are constant (zero variance, so every month fails).
//
// Given
// -----
// - Two locations: location 0 follows the scenario, location 1 is all
//   zeros.
//
// Expect
// ------
// - `PropagateNan`: location 1 has NaN coefficients and failed
//   diagnostics in all 12 months, location 0 is fitted, and the forward
//   transform is NaN exactly on location 1.
// - `Abort`: `PTError::FitFailed` naming month 0, location 1.
fn failure_policies_handle_degenerate_location() {
    let mut grid = scenario_residuals(2);
    grid.column_mut(1).fill(0.0);
    let residuals = MonthlyResiduals::new(grid).expect("valid residuals");
    let predictor = YearlyPredictor::new(scenario_predictor(2)).expect("valid predictor");

    let fitted = fit_yeo_johnson_transform(
        &residuals,
        &predictor,
        &sequential_options(FailurePolicy::PropagateNan),
    )
    .expect("NaN propagation should not abort");

    assert_eq!(fitted.diagnostics.n_failed(), 12);
    for month in 0..12 {
        assert!(fitted.coefficients.is_fitted(month, 0));
        assert!(!fitted.coefficients.is_fitted(month, 1));
        let failed = fitted.diagnostics.get(month, 1).expect("diagnostics present");
        assert_eq!(failed.status, UnitStatus::Failed);
        assert!(!failed.message.is_empty());
    }

    let forward = fitted.transform(&residuals, &predictor).expect("transform should succeed");
    assert!(forward.values.column(0).iter().all(|v| v.is_finite()));
    assert!(forward.values.column(1).iter().all(|v| v.is_nan()));

    let aborted = fit_yeo_johnson_transform(
        &residuals,
        &predictor,
        &sequential_options(FailurePolicy::Abort),
    );
    assert!(matches!(aborted, Err(PTError::FitFailed { month: 0, location: 1, .. })));
}

#[test]
// Purpose
// -------
// Apply user-supplied coefficients without fitting and verify the
// closed-form identity case.
//
// Given
// -----
// - `ξ₀ = 1`, `ξ₁ = 0` for every unit (so `λ = 1`) on two locations.
//
// Expect
// ------
// - Forward and inverse transforms both return the input unchanged, and
//   every reported lambda equals `1`.
// - A predictor with the wrong number of years is rejected.
fn identity_coefficients_leave_series_unchanged() {
    let coeffs = Array::from_shape_fn((12, 2, 2), |(_, _, c)| if c == 0 { 1.0 } else { 0.0 });
    let coefficients = LambdaCoefficients::from_array(coeffs).expect("valid coefficients");
    let residuals = MonthlyResiduals::new(scenario_residuals(2)).expect("valid residuals");
    let predictor = YearlyPredictor::new(scenario_predictor(2)).expect("valid predictor");

    let forward = yeo_johnson_transform_series(&residuals, &coefficients, &predictor)
        .expect("transform should succeed");
    let inverse = inverse_yeo_johnson_transform_series(&residuals, &coefficients, &predictor)
        .expect("inverse should succeed");

    for ((&x, &t), &i) in residuals.view().iter().zip(forward.values.iter()).zip(inverse.values.iter())
    {
        assert_abs_diff_eq!(x, t, epsilon = 1e-12);
        assert_abs_diff_eq!(x, i, epsilon = 1e-12);
    }
    assert!(forward.lambdas.iter().all(|&lambda| lambda == 1.0));

    let short_predictor =
        YearlyPredictor::new(array![[0.2, 0.2], [0.5, 0.5]]).expect("valid predictor");
    assert!(matches!(
        yeo_johnson_transform_series(&residuals, &coefficients, &short_predictor),
        Err(PTError::YearMismatch { .. })
    ));
}
