//! Public API surface for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait users implement for their model.
//! - [`Bounds`]: optional box constraints on the parameter vector.
//! - [`MLEOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`OptimOutcome`]: normalized result returned by the high-level `maximize` API.
//!
//! Convention: we *maximize* a user log-likelihood `ℓ(θ)` by minimizing the cost
//! `c(θ) = -ℓ(θ)` with a derivative-free simplex method, so no gradient is
//! ever requested from the model.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Theta,
        types::{DEFAULT_SD_TOL, MAX_ITER_PER_PARAM},
        validation::{
            validate_bounds, validate_theta_hat, validate_value, verify_max_iter, verify_sd_tol,
        },
    },
};
use argmin::core::{TerminationReason, TerminationStatus};

/// User-implemented log-likelihood interface.
///
/// You maximize `ℓ(θ)`; internally we minimize the cost `c(θ) = -ℓ(θ)`.
///
/// - `type Data`: per-model data carried into `value`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `ℓ(θ)`.
///   - Errors: return a descriptive `OptError` for invalid inputs or model failures.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before optimization.
///
/// Optional:
/// - `bounds() -> Option<&Bounds>`: box constraints. When present, every
///   evaluated `θ` is projected onto the box before `value` sees it, and
///   the optimizer penalizes the distance to the box.
pub trait LogLikelihood {
    type Data: 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn bounds(&self) -> Option<&Bounds> {
        None
    }
}

/// Box constraints `lower[i] ≤ θ[i] ≤ upper[i]`.
///
/// Infinite entries denote an open side. Constraints are enforced by
/// projection plus a penalty: the likelihood is only ever evaluated at the
/// clipped point, a vertex outside the box additionally pays
/// `BOUNDS_PENALTY · ‖θ − P(θ)‖²`, and the reported estimate is clipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Construct validated bounds.
    ///
    /// # Errors
    /// - [`OptError::BoundsLengthMismatch`] if the vectors differ in length.
    /// - [`OptError::InvalidBounds`] if a pair is NaN or inverted.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> OptResult<Self> {
        validate_bounds(&lower, &upper)?;
        Ok(Self { lower, upper })
    }

    /// Number of constrained coordinates.
    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Clip `theta` onto the box, returning a new vector.
    pub fn project(&self, theta: &Theta) -> Theta {
        let mut projected = theta.clone();
        self.project_in_place(&mut projected);
        projected
    }

    /// Clip `theta` onto the box in place.
    ///
    /// Coordinates beyond `self.len()` are left untouched.
    pub fn project_in_place(&self, theta: &mut Theta) {
        for ((value, &lo), &hi) in theta.iter_mut().zip(&self.lower).zip(&self.upper) {
            *value = value.max(lo).min(hi);
        }
    }

    /// Squared Euclidean distance from `theta` to the box; `0` inside it.
    pub fn squared_distance(&self, theta: &Theta) -> f64 {
        theta
            .iter()
            .zip(&self.lower)
            .zip(&self.upper)
            .map(|((&value, &lo), &hi)| {
                let gap = value - value.max(lo).min(hi);
                gap * gap
            })
            .sum()
    }

    /// Whether every coordinate of `theta` lies inside the box.
    pub fn contains(&self, theta: &Theta) -> bool {
        theta
            .iter()
            .zip(&self.lower)
            .zip(&self.upper)
            .all(|((&value, &lo), &hi)| value >= lo && value <= hi)
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — stopping rule and iteration cap.
/// - `verbose: bool` — if `true`, attaches an observer (behind the `obs_slog`
///   feature) and prints progress.
///
/// Default:
/// - `tols`: `sd_tol = 1e-8`, `max_iter = 400`
/// - `verbose`: `false`
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub verbose: bool,
}

impl MLEOptions {
    /// Create a new set of optimizer options.
    ///
    /// This constructor does not mutate values; validation of numeric fields is
    /// performed inside [`Tolerances::new`].
    pub fn new(tols: Tolerances, verbose: bool) -> Self {
        Self { tols, verbose }
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self { tols: Tolerances::default(), verbose: false }
    }
}

/// Stopping rule and iteration limit used by the optimizer.
///
/// - `sd_tol`: terminate when the standard deviation of the simplex vertex
///   costs falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations; bounds the
///   worst-case runtime of a single fit.
///
/// Either field can be `None` but **at least one** must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub sd_tol: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `sd_tol` or `max_iter` must be `Some`.
    /// - If provided, `sd_tol` must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if both are `None`.
    /// - [`OptError::InvalidSdTol`] for non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(sd_tol: Option<f64>, max_iter: Option<usize>) -> OptResult<Self> {
        if sd_tol.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_sd_tol(sd_tol)?;
        verify_max_iter(max_iter)?;
        Ok(Self { sd_tol, max_iter })
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { sd_tol: Some(DEFAULT_SD_TOL), max_iter: Some(2 * MAX_ITER_PER_PARAM) }
    }
}

/// Canonical result returned by `maximize`.
///
/// - `theta_hat`: best parameter vector found (inside the bounds, if any).
/// - `value`: best **log-likelihood** value `ℓ(θ)` (not the cost).
/// - `converged`: `true` only if the solver stopped on its own convergence
///   criterion; hitting the iteration cap is reported as not converged.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and all finite).
    /// - `value` check via `validate_value` (finite).
    /// - Maps `TerminationStatus` into `(converged, status)`.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: &TerminationStatus,
        iterations: u64, fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => {
                let converged = matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                );
                (converged, format!("{reason:?}"))
            }
        };
        let iterations = iterations as usize;
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Ensure `Tolerances::new` requires at least one stopping rule.
    //
    // Given
    // -----
    // - `sd_tol = None`, `max_iter = None`.
    //
    // Expect
    // ------
    // - `Err(OptError::NoTolerancesProvided)`.
    fn tolerances_new_requires_a_stopping_rule() {
        assert_eq!(Tolerances::new(None, None), Err(OptError::NoTolerancesProvided));
    }

    #[test]
    // Purpose
    // -------
    // Verify that the default options carry the documented iteration cap
    // of 200 iterations per free parameter for a two-parameter model.
    //
    // Given
    // -----
    // - `MLEOptions::default()`.
    //
    // Expect
    // ------
    // - `max_iter == Some(400)`, `sd_tol == Some(DEFAULT_SD_TOL)`, not verbose.
    fn mle_options_default_matches_documented_values() {
        let opts = MLEOptions::default();

        assert_eq!(opts.tols.max_iter, Some(400));
        assert_eq!(opts.tols.sd_tol, Some(DEFAULT_SD_TOL));
        assert!(!opts.verbose);
    }

    #[test]
    // Purpose
    // -------
    // Check that projection clips each coordinate into its own interval and
    // leaves interior coordinates untouched.
    //
    // Given
    // -----
    // - Bounds `[0, ∞) × [-0.1, 0.1]`.
    // - `θ = [-0.5, 0.3]` and `θ = [2.0, 0.05]`.
    //
    // Expect
    // ------
    // - `[0.0, 0.1]` and `[2.0, 0.05]` respectively; `contains` agrees.
    fn bounds_project_clips_into_box() {
        let bounds = Bounds::new(vec![0.0, -0.1], vec![f64::INFINITY, 0.1])
            .expect("bounds should be valid");

        let outside = array![-0.5, 0.3];
        let inside = array![2.0, 0.05];

        assert_eq!(bounds.project(&outside), array![0.0, 0.1]);
        assert_eq!(bounds.project(&inside), inside);
        assert!(!bounds.contains(&outside));
        assert!(bounds.contains(&inside));
    }

    #[test]
    // Purpose
    // -------
    // Verify the distance to the box is zero inside and grows with the
    // overshoot outside, per coordinate.
    //
    // Given
    // -----
    // - Bounds `[0, ∞) × [-0.1, 0.1]`.
    // - `θ = [3.0, 0.0]`, `[-0.5, 0.0]`, `[-0.5, 0.3]`.
    //
    // Expect
    // ------
    // - `0`, `0.25`, and `0.25 + 0.04`.
    fn bounds_squared_distance_measures_overshoot() {
        let bounds = Bounds::new(vec![0.0, -0.1], vec![f64::INFINITY, 0.1])
            .expect("bounds should be valid");

        assert_eq!(bounds.squared_distance(&array![3.0, 0.0]), 0.0);
        assert_abs_diff_eq!(bounds.squared_distance(&array![-0.5, 0.0]), 0.25, epsilon = 1e-15);
        assert_abs_diff_eq!(bounds.squared_distance(&array![-0.5, 0.3]), 0.29, epsilon = 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Ensure only genuine convergence is reported as `converged`.
    //
    // Given
    // -----
    // - Termination by `SolverConverged` and by `MaxItersReached`.
    //
    // Expect
    // ------
    // - `converged == true` for the former, `false` for the latter; both
    //   carry a non-empty status string.
    fn optim_outcome_distinguishes_convergence_from_iteration_cap() {
        let converged = OptimOutcome::new(
            Some(array![1.0, 0.0]),
            -3.0,
            &TerminationStatus::Terminated(TerminationReason::SolverConverged),
            12,
            FnEvalMap::new(),
        )
        .expect("outcome should be valid");
        let capped = OptimOutcome::new(
            Some(array![1.0, 0.0]),
            -3.0,
            &TerminationStatus::Terminated(TerminationReason::MaxItersReached),
            400,
            FnEvalMap::new(),
        )
        .expect("outcome should be valid");

        assert!(converged.converged);
        assert!(!capped.converged);
        assert!(!capped.status.is_empty());
        assert_eq!(capped.iterations, 400);
    }
}
