//! High-level entry point for maximizing a user-provided `LogLikelihood`.
//!
//! This validates the starting point, wraps the model in an `ArgMinAdapter`
//! (which *minimizes* `-ℓ(θ)` at the bounds-projected point, plus a
//! penalty outside the box), builds a
//! Nelder–Mead simplex around the guess, and delegates the run to
//! `run_nelder_mead`.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::build_nelder_mead,
        run::run_nelder_mead,
        traits::{LogLikelihood, MLEOptions},
        validation::validate_theta0,
    },
};

/// Maximize a log-likelihood `ℓ(θ)` using the Nelder–Mead simplex method.
///
/// # Behavior
/// - Checks that `theta0` is finite and, when the model declares bounds,
///   that its length matches the number of bounded coordinates.
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Builds the initial simplex (clipped onto the bounds, if any).
/// - Calls `run_nelder_mead`, which configures the executor (max iters,
///   optional observers) and returns an `OptimOutcome`.
///
/// # Parameters
/// - `f`: Your model implementing [`LogLikelihood`].
/// - `theta0`: Initial parameter vector.
/// - `data`: Model data passed through to `value`/`check`.
/// - `opts`: Optimizer options (tolerances, verbosity).
///
/// # Errors
/// - [`OptError::ThetaLengthMismatch`](crate::optimization::errors::OptError::ThetaLengthMismatch)
///   or [`OptError::InvalidThetaInput`](crate::optimization::errors::OptError::InvalidThetaInput)
///   for a malformed starting point.
/// - Propagates any error from `f.check`.
/// - Propagates builder and runtime errors.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use rust_yeojohnson::optimization::errors::OptResult;
/// use rust_yeojohnson::optimization::loglik_optimizer::{
///     maximize, LogLikelihood, MLEOptions, Theta,
/// };
///
/// struct MyLL;
/// impl LogLikelihood for MyLL {
///     type Data = ();
///     fn value(&self, theta: &Theta, _: &()) -> OptResult<f64> {
///         // Simple concave log-likelihood: -(θ·θ)
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Theta, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&MyLL, array![0.1, -0.2], &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), rust_yeojohnson::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    let dim = f.bounds().map_or(theta0.len(), |b| b.len());
    validate_theta0(&theta0, dim)?;
    f.check(&theta0, data)?;
    let solver = build_nelder_mead(&theta0, f.bounds(), opts)?;
    let problem = ArgMinAdapter::new(f, data);
    run_nelder_mead(&theta0, problem, solver, opts)
}
