//! Adapter that exposes a user `LogLikelihood` as an `argmin` problem.
//!
//! We convert a *maximization* of a log-likelihood `ℓ(θ)` into a *minimization*
//! problem by defining the cost as `c(θ) = -ℓ(θ)`. When the model declares
//! box constraints, `θ` is projected onto the box before evaluation and the
//! squared distance to the box is added as a penalty:
//!
//! ```text
//! c(θ) = -ℓ(P(θ)) + BOUNDS_PENALTY · ‖θ − P(θ)‖²
//! ```
//!
//! Inside the box this is the plain negative log-likelihood. Outside it the
//! cost is strictly larger than at the projected point, so simplex vertices
//! that leave the box are pushed back instead of collapsing onto a flat
//! boundary face.
use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        traits::LogLikelihood,
        types::{BOUNDS_PENALTY, Cost, Theta},
    },
};
use argmin::core::{CostFunction, Error};

/// Bridges a user `LogLikelihood` to `argmin`'s `CostFunction`.
///
/// - `CostFunction::cost` returns `-ℓ(P(θ))` plus the out-of-box penalty,
///   where `P` is the projection onto `f.bounds()` (identity when the model
///   is unconstrained).
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the cost `c(θ) = -ℓ(P(θ)) + BOUNDS_PENALTY · ‖θ − P(θ)‖²`.
    ///
    /// - Projects `θ` onto the model bounds, if any.
    /// - Calls the user's `value(P(θ), data)` and checks the result is finite.
    /// - Adds the penalty for the distance between `θ` and `P(θ)`.
    ///
    /// # Errors
    /// - `Error(NonFiniteCost)` if the log-likelihood is not finite.
    /// - Propagates any `OptError` from the user’s `value` via `?`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let (output, penalty) = match self.f.bounds() {
            Some(bounds) => {
                let projected = bounds.project(theta);
                let penalty = BOUNDS_PENALTY * bounds.squared_distance(theta);
                (self.f.value(&projected, self.data)?, penalty)
            }
            None => (self.f.value(theta, self.data)?, 0.0),
        };
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(penalty - output)
    }
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a user `LogLikelihood` and its data.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}
