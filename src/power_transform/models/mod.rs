//! power_transform::models — likelihood, fitting, and transform orchestration.
//!
//! Purpose
//! -------
//! Wire the core kernels into the user-facing operations: fit the logistic
//! lambda coefficients per `(month, location)` by maximum likelihood, then
//! apply (or invert) the transform on whole `(time, location)` series.
//!
//! Key behaviors
//! -------------
//! - [`likelihood`]: [`likelihood::YeoJohnsonLikelihood`] implements the
//!   optimizer's `LogLikelihood` over `θ = [ξ₀, ξ₁]`, with NaN-free
//!   [`likelihood::FitSample`] data.
//! - [`monthly`]: [`monthly::fit_unit`] and
//!   [`monthly::fit_yeo_johnson_transform`], with per-unit diagnostics and
//!   the configured failure policy.
//! - [`transform`]: lambdas from covariates plus forward and inverse series
//!   transforms returning [`transform::PowerTransformResult`].
//!
//! Testing notes
//! -------------
//! - Unit tests here use small synthetic grids; the end-to-end pipeline
//!   (fit → transform → inverse) is exercised in `tests/`.

pub mod likelihood;
pub mod monthly;
pub mod transform;
