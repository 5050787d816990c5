//! loglik_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the core numeric types and solver aliases used by the
//! log-likelihood optimizer. By defining these in one place, the rest of
//! the optimization code can stay agnostic to `ndarray` and Argmin
//! generics and can more easily evolve if the backend changes.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for parameter vectors and scalar costs
//!   (`Theta`, `Cost`).
//! - Provide a standard map type for Argmin function-evaluation counters
//!   (`FnEvalMap`).
//! - Expose the pre-wired Nelder–Mead solver, using the common
//!   `(Theta, Cost)` numeric shapes.
//! - Fix the constants that shape the initial simplex, the default
//!   stopping rule, and the out-of-box penalty.
//!
//! Invariants & assumptions
//! ------------------------
//! - All optimizer vectors are represented as `ndarray` containers over
//!   `f64`.
//! - `Cost` is always a scalar `f64`; higher layers handle any sign flips
//!   between cost and log-likelihood.
//! - The solver never sees the box constraints; the adapter adds
//!   [`BOUNDS_PENALTY`] times the squared distance to the box to every
//!   cost evaluated outside it.
//!
//! Conventions
//! -----------
//! - `Theta` is treated conceptually as a column vector with length equal
//!   to the number of free parameters.
//! - Simplex construction follows the classic rule of perturbing each
//!   non-zero coordinate by 5 % and each zero coordinate by a fixed
//!   absolute step.
//!
//! Testing notes
//! -------------
//! - This module only defines type aliases and constants; there are no
//!   dedicated unit tests.
//! - Correctness is exercised indirectly by tests in the surrounding
//!   optimizer modules that instantiate solvers and operate on these
//!   aliases.
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use std::collections::HashMap;

/// Parameter vector `θ` for log-likelihood optimization.
///
/// Alias for `ndarray::Array1<f64>`, used as the canonical parameter type
/// throughout the optimizer.
pub type Theta = Array1<f64>;

/// Scalar objective value used by the optimizer.
///
/// In this crate, this is the cost `c(θ) = -ℓ(θ)` derived from a
/// log-likelihood `ℓ(θ)`.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Nelder–Mead simplex solver specialized to this crate’s numeric types.
pub type NelderMeadSolver = NelderMead<Theta, Cost>;

/// Relative step applied to non-zero coordinates when building the simplex.
pub const NONZERO_SIMPLEX_STEP: f64 = 0.05;

/// Absolute step applied to zero coordinates when building the simplex.
pub const ZERO_SIMPLEX_STEP: f64 = 0.00025;

/// Default iteration budget per free parameter.
pub const MAX_ITER_PER_PARAM: usize = 200;

/// Default standard-deviation tolerance on simplex vertex costs.
pub const DEFAULT_SD_TOL: f64 = 1e-8;

/// Weight of the squared distance to the box added to out-of-box costs.
///
/// Any positive weight keeps the cost strictly increasing away from the
/// box, so vertices outside it never tie with their projection. Large
/// weights make the walls steep enough to collapse the simplex before the
/// coordinates along a boundary face are optimized.
pub const BOUNDS_PENALTY: f64 = 1.0;
