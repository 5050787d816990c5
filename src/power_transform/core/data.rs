//! Data containers for monthly residuals, yearly predictors, and fitted
//! coefficients.
//!
//! Purpose
//! -------
//! Provide small, validated containers for the three grids the power
//! transform consumes and produces. This module centralizes shape checks so
//! the fitting and transform layers can assume consistent axes.
//!
//! Key behaviors
//! -------------
//! - [`MonthlyResiduals`] stores a `(time, location)` grid whose time axis
//!   covers whole years (`n_time % 12 == 0`), time index `t = 12·year + month`.
//! - [`YearlyPredictor`] stores a `(year, location)` covariate grid.
//! - [`LambdaCoefficients`] stores a `(month, location, coeff)` grid with
//!   `coeff ∈ {ξ₀, ξ₁}`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Grids are non-empty along every axis.
//! - NaN values are allowed in residuals and predictors (they are dropped
//!   pairwise during fitting and propagate through transforms).
//! - Coefficient pairs are either both finite with `ξ₀ ≥ 0`, or contain NaN
//!   (the failed-fit sentinel).
//!
//! Conventions
//! -----------
//! - Constructors accept the time (or year) axis position so callers holding
//!   `(location, time)` data do not need to transpose by hand.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the whole-year check, axis handling, month slicing, and
//!   coefficient validation.
use crate::power_transform::{
    core::lambda::LambdaCoeffs,
    errors::{PTError, PTResult},
};
use ndarray::{Array2, Array3, ArrayView1, ArrayView2, Axis, s};

/// Number of calendar months per year.
pub const N_MONTHS: usize = 12;

/// Number of coefficients per `(month, location)` unit.
pub const N_COEFFS: usize = 2;

fn oriented(data: Array2<f64>, axis: Axis) -> Array2<f64> {
    if axis == Axis(1) { data.reversed_axes() } else { data }
}

/// `MonthlyResiduals` — `(time, location)` grid of monthly residuals.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyResiduals {
    data: Array2<f64>,
}

impl MonthlyResiduals {
    /// Construct from a `(time, location)` grid.
    ///
    /// Errors
    /// ------
    /// - `PTError::EmptyInput` if either axis is empty.
    /// - `PTError::IncompleteYears` if the time axis is not a multiple of 12.
    pub fn new(data: Array2<f64>) -> PTResult<Self> {
        let (n_time, n_locations) = data.dim();
        if n_time == 0 || n_locations == 0 {
            return Err(PTError::EmptyInput);
        }
        if n_time % N_MONTHS != 0 {
            return Err(PTError::IncompleteYears { n_time });
        }
        Ok(Self { data })
    }

    /// Construct from a grid whose time axis is `time_axis`.
    ///
    /// `Axis(0)` means `(time, location)`; `Axis(1)` means
    /// `(location, time)`.
    ///
    /// Errors
    /// ------
    /// - `PTError::InvalidAxis` for any other axis, plus the errors of
    ///   [`MonthlyResiduals::new`].
    pub fn from_axis(data: Array2<f64>, time_axis: Axis) -> PTResult<Self> {
        if time_axis.index() > 1 {
            return Err(PTError::InvalidAxis { axis: time_axis.index() });
        }
        Self::new(oriented(data, time_axis))
    }

    pub fn n_time(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_years(&self) -> usize {
        self.n_time() / N_MONTHS
    }

    pub fn n_locations(&self) -> usize {
        self.data.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// `(year, location)` view of all samples of one calendar month.
    ///
    /// `month` must be `< 12`.
    pub fn month_slice(&self, month: usize) -> ArrayView2<'_, f64> {
        self.data.slice(s![month..;N_MONTHS, ..])
    }
}

/// `YearlyPredictor` — `(year, location)` grid of yearly covariates.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyPredictor {
    data: Array2<f64>,
}

impl YearlyPredictor {
    /// Construct from a `(year, location)` grid.
    ///
    /// Errors
    /// ------
    /// - `PTError::EmptyInput` if either axis is empty.
    pub fn new(data: Array2<f64>) -> PTResult<Self> {
        if data.is_empty() {
            return Err(PTError::EmptyInput);
        }
        Ok(Self { data })
    }

    /// Construct from a grid whose year axis is `year_axis` (see
    /// [`MonthlyResiduals::from_axis`]).
    pub fn from_axis(data: Array2<f64>, year_axis: Axis) -> PTResult<Self> {
        if year_axis.index() > 1 {
            return Err(PTError::InvalidAxis { axis: year_axis.index() });
        }
        Self::new(oriented(data, year_axis))
    }

    pub fn n_years(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_locations(&self) -> usize {
        self.data.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Covariate series of one location.
    pub fn location(&self, location: usize) -> ArrayView1<'_, f64> {
        self.data.column(location)
    }
}

/// `LambdaCoefficients` — fitted `(ξ₀, ξ₁)` per month and location.
///
/// Stored as an `Array3` of shape `(12, n_locations, 2)`. Immutable once
/// constructed; a fit produces a new instance.
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaCoefficients {
    coeffs: Array3<f64>,
}

impl LambdaCoefficients {
    /// Construct from a `(12, n_locations, 2)` array.
    ///
    /// Errors
    /// ------
    /// - `PTError::EmptyInput` if there are no locations.
    /// - `PTError::CoeffShape` if the month or coefficient axis is wrong.
    /// - `PTError::InvalidCoefficient` for a pair that is neither a NaN
    ///   sentinel nor finite with `ξ₀ ≥ 0`.
    pub fn from_array(coeffs: Array3<f64>) -> PTResult<Self> {
        let (n_months, n_locations, n_coeffs) = coeffs.dim();
        if n_months != N_MONTHS || n_coeffs != N_COEFFS {
            return Err(PTError::CoeffShape {
                expected: (N_MONTHS, n_locations, N_COEFFS),
                found: (n_months, n_locations, n_coeffs),
            });
        }
        if n_locations == 0 {
            return Err(PTError::EmptyInput);
        }
        for month in 0..N_MONTHS {
            for location in 0..n_locations {
                let (xi0, xi1) = (coeffs[[month, location, 0]], coeffs[[month, location, 1]]);
                if xi0.is_nan() || xi1.is_nan() {
                    continue;
                }
                if !xi0.is_finite() || xi0 < 0.0 {
                    return Err(PTError::InvalidCoefficient {
                        month,
                        location,
                        value: xi0,
                        reason: "xi0 must be finite and non-negative.",
                    });
                }
                if !xi1.is_finite() {
                    return Err(PTError::InvalidCoefficient {
                        month,
                        location,
                        value: xi1,
                        reason: "xi1 must be finite.",
                    });
                }
            }
        }
        Ok(Self { coeffs })
    }

    pub(crate) fn from_units(n_locations: usize, units: &[LambdaCoeffs]) -> PTResult<Self> {
        let flat: Vec<f64> = units.iter().flat_map(|c| c.to_array()).collect();
        let coeffs = Array3::from_shape_vec((N_MONTHS, n_locations, N_COEFFS), flat).map_err(
            |_| PTError::LengthMismatch {
                expected: N_MONTHS * n_locations,
                actual: units.len(),
            },
        )?;
        Self::from_array(coeffs)
    }

    pub fn n_locations(&self) -> usize {
        self.coeffs.len_of(Axis(1))
    }

    pub fn xi0(&self, month: usize, location: usize) -> f64 {
        self.coeffs[[month, location, 0]]
    }

    pub fn xi1(&self, month: usize, location: usize) -> f64 {
        self.coeffs[[month, location, 1]]
    }

    pub fn coeffs(&self, month: usize, location: usize) -> LambdaCoeffs {
        LambdaCoeffs::new(self.xi0(month, location), self.xi1(month, location))
    }

    /// Whether the unit carries a usable (non-sentinel) coefficient pair.
    pub fn is_fitted(&self, month: usize, location: usize) -> bool {
        !self.coeffs(month, location).is_nan()
    }

    pub fn as_array(&self) -> &Array3<f64> {
        &self.coeffs
    }
}
