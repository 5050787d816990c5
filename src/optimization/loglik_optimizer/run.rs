//! Execution helper that runs the Nelder–Mead solver on a log-likelihood
//! problem and returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
        types::NelderMeadSolver,
    },
};
#[cfg(feature = "obs_slog")]
use argmin::core::CostFunction;
use argmin::core::{Executor, State};

/// Run a Nelder–Mead optimization for a log-likelihood problem.
///
/// This wires up:
/// - the user model via [`ArgMinAdapter`],
/// - a fully constructed simplex solver (see
///   [`build_nelder_mead`](crate::optimization::loglik_optimizer::builders::build_nelder_mead)),
/// - optional observers (behind the `obs_slog` feature),
/// - optional `max_iters`,
///
/// then executes the solver and converts the result into [`OptimOutcome`].
///
/// The simplex itself carries the starting point, so no initial parameter is
/// set on the executor state.
///
/// # Feature flags
/// If the `obs_slog` feature is enabled and `opts.verbose == true`, a terminal
/// slog observer is attached with `ObserverMode::Always` and ℓ(θ₀) is logged
/// once before the first iteration.
///
/// # Returns
/// An [`OptimOutcome`] containing the best parameter found (projected onto
/// the model bounds, if any), the log-likelihood re-evaluated at that point
/// (so it never includes the out-of-box penalty), termination status,
/// iteration count and function-evaluation counts.
///
/// # Errors
/// - Propagates any `argmin` runtime error, including domain errors raised by
///   the model inside a cost evaluation, via `From<argmin::core::Error>`.
/// - Propagates validation errors encountered when constructing
///   [`OptimOutcome`].
#[cfg_attr(not(feature = "obs_slog"), allow(unused_variables))]
pub fn run_nelder_mead<F>(
    theta0: &Theta, problem: ArgMinAdapter<'_, F>, solver: NelderMeadSolver, opts: &MLEOptions,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
{
    let (model, data) = (problem.f, problem.data);
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(theta0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver);
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let theta_hat = match (result.take_best_param(), model.bounds()) {
        (Some(theta), Some(b)) => Some(b.project(&theta)),
        (theta, _) => theta,
    };
    let value = match theta_hat.as_ref() {
        Some(theta) => model.value(theta, data)?,
        None => -result.get_best_cost(),
    };
    OptimOutcome::new(theta_hat, value, &termination, iterations, function_counts)
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: LogLikelihood,
{
    let ll0 = -problem.cost(theta0)?;
    log::info!("init: ell(theta0) = {ll0:.6}");
    Ok(())
}
