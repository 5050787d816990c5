//! loglik_optimizer::builders — Nelder–Mead solver construction helpers.
//!
//! Purpose
//! -------
//! Provide small, focused builders for the derivative-free simplex solver
//! used by the log-likelihood optimizer. These helpers hide Argmin’s
//! generic wiring, build the initial simplex around a starting point, and
//! apply crate-level options (the simplex-spread tolerance) so that
//! higher-level code can request a configured solver without touching
//! Argmin-specific types.
//!
//! Key behaviors
//! -------------
//! - Build an `n + 1` vertex simplex around `theta0` by perturbing one
//!   coordinate per vertex: 5 % for non-zero coordinates, a fixed
//!   `0.00025` step for zero coordinates.
//! - Clip every vertex onto the model bounds when bounds are present, so
//!   the simplex starts inside the feasible box.
//! - Apply the optional `sd_tol` from [`MLEOptions`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `theta0` has already been validated (finite, correct length).
//! - A perturbed vertex that collapses onto `theta0` after clipping (the
//!   coordinate sits on an upper bound) is stepped in the opposite
//!   direction instead, keeping the simplex non-degenerate.
//! - The builders do **not** set `max_iters`; this is applied by the
//!   runner.
//!
//! Testing notes
//! -------------
//! - Unit tests verify the simplex geometry (vertex count, step sizes,
//!   clipping) and the propagation of tolerances.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::{Bounds, MLEOptions},
        types::{NONZERO_SIMPLEX_STEP, NelderMeadSolver, Theta, ZERO_SIMPLEX_STEP},
    },
};

/// initial_simplex — build the starting simplex around `theta0`.
///
/// Parameters
/// ----------
/// - `theta0`: `&Theta`
///   Starting point; becomes the first vertex.
/// - `bounds`: `Option<&Bounds>`
///   Optional box constraints; vertices are clipped onto the box.
///
/// Returns
/// -------
/// `Vec<Theta>` with `theta0.len() + 1` vertices.
pub fn initial_simplex(theta0: &Theta, bounds: Option<&Bounds>) -> Vec<Theta> {
    let project = |theta: Theta| match bounds {
        Some(b) => b.project(&theta),
        None => theta,
    };
    let origin = project(theta0.clone());
    let mut simplex = Vec::with_capacity(origin.len() + 1);
    simplex.push(origin.clone());
    for i in 0..origin.len() {
        let step = if origin[i] != 0.0 { NONZERO_SIMPLEX_STEP * origin[i] } else { ZERO_SIMPLEX_STEP };
        let mut vertex = origin.clone();
        vertex[i] += step;
        let mut vertex = project(vertex);
        if vertex[i] == origin[i] {
            vertex[i] -= step;
            vertex = project(vertex);
        }
        simplex.push(vertex);
    }
    simplex
}

/// build_nelder_mead — construct a Nelder–Mead solver around `theta0`.
///
/// Parameters
/// ----------
/// - `theta0`: `&Theta`
///   Validated starting point.
/// - `bounds`: `Option<&Bounds>`
///   Optional box constraints used to clip the initial simplex.
/// - `opts`: `&MLEOptions`
///   Source of the optional `sd_tol` stopping rule.
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) when Argmin rejects the
///   tolerance.
///
/// Notes
/// -----
/// - When `sd_tol` is `None`, Argmin’s default (machine epsilon) remains in
///   effect, and in practice the iteration cap decides termination.
pub fn build_nelder_mead(
    theta0: &Theta, bounds: Option<&Bounds>, opts: &MLEOptions,
) -> OptResult<NelderMeadSolver> {
    let mut solver = NelderMeadSolver::new(initial_simplex(theta0, bounds));
    if let Some(tol) = opts.tols.sd_tol {
        solver = solver.with_sd_tolerance(tol)?;
    }
    Ok(solver)
}
