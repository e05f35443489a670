//! Configuration for the cumulant session.
//!
//! Purpose
//! -------
//! Collect the knobs that change *how* the integrated cumulants are computed
//! without changing the input data: the bandwidth `h_max`, the execution
//! strategy, and two compatibility flags that select between the reference
//! estimator formulas and their corrected forms.
//!
//! Key behaviors
//! -------------
//! - [`CumulantOptions::new`] validates `h_max` (finite, `> 0`).
//! - [`ExecutionStrategy`] parses the legacy `"classic"` / `"parallel"` names.
//! - [`TrendConvention`] and [`ThirdCumulantFormula`] default to the
//!   reference behavior so that outputs match previously published numbers;
//!   [`CumulantOptions::consistent`] switches both to the corrected forms.
//!
//! Conventions
//! -----------
//! - The strategy stored here is only the session default; every engine
//!   operation also has a `*_with` form taking the strategy explicitly.
use std::str::FromStr;

use crate::cumulants::errors::{CumulantError, CumulantResult};

/// Default bandwidth used by the reference datasets.
pub const DEFAULT_H_MAX: f64 = 40.0;

/// How per-pair statistics are evaluated inside one stage.
///
/// Variants:
/// - `Sequential`: nested loop over `(i, j)` on the calling thread.
/// - `Parallel`: the `d²` index space is mapped on the rayon pool and
///   gathered before the stage returns.
///
/// Both variants produce bit-identical arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    Sequential,
    #[default]
    Parallel,
}

impl FromStr for ExecutionStrategy {
    type Err = CumulantError;

    /// Accepts `"sequential"`, `"classic"` and `"parallel"` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "classic" => Ok(ExecutionStrategy::Sequential),
            "parallel" => Ok(ExecutionStrategy::Parallel),
            _ => Err(CumulantError::UnknownStrategy { name: s.to_string() }),
        }
    }
}

/// Centering trend applied to the first count in the third-moment kernel.
///
/// - `Reference`: `trend_i = L_j·(b − a)`, as the published estimator does.
///   Only off-diagonal entries of `E_c[.., .., 0]` are affected, and only when
///   `L_i ≠ L_j`.
/// - `Corrected`: `trend_i = L_i·(b − a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendConvention {
    #[default]
    Reference,
    Corrected,
}

/// Assembly formula for the empirical third cumulant `K_c`.
///
/// With `M = h·C − 2J`:
/// - `Reference`: `(2·E0 − L_j·M_ij + E1 − L_i·M_jj) / 3`.
/// - `Balanced`: `(2·(E0 − L_j·M_ij) + E1 − L_i·M_jj) / 3`, which subtracts the
///   pair correction once per third-moment term and is unbiased for Poisson
///   input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThirdCumulantFormula {
    #[default]
    Reference,
    Balanced,
}

/// Validated session options.
///
/// Fields are private so that `h_max` can only be set through the
/// validating constructors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CumulantOptions {
    h_max: f64,
    strategy: ExecutionStrategy,
    trend: TrendConvention,
    formula: ThirdCumulantFormula,
}

impl CumulantOptions {
    /// Construct options with reference formulas.
    ///
    /// # Errors
    /// [`CumulantError::InvalidBandwidth`] when `h_max` is not finite or `≤ 0`.
    pub fn new(h_max: f64, strategy: ExecutionStrategy) -> CumulantResult<Self> {
        verify_bandwidth(h_max)?;
        Ok(Self {
            h_max,
            strategy,
            trend: TrendConvention::Reference,
            formula: ThirdCumulantFormula::Reference,
        })
    }

    /// Options with the corrected trend and the balanced `K_c` formula.
    ///
    /// # Errors
    /// Same as [`CumulantOptions::new`].
    pub fn consistent(h_max: f64, strategy: ExecutionStrategy) -> CumulantResult<Self> {
        Ok(Self::new(h_max, strategy)?
            .with_trend(TrendConvention::Corrected)
            .with_formula(ThirdCumulantFormula::Balanced))
    }

    pub fn with_trend(mut self, trend: TrendConvention) -> Self {
        self.trend = trend;
        self
    }

    pub fn with_formula(mut self, formula: ThirdCumulantFormula) -> Self {
        self.formula = formula;
        self
    }

    pub fn h_max(&self) -> f64 {
        self.h_max
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    pub fn trend(&self) -> TrendConvention {
        self.trend
    }

    pub fn formula(&self) -> ThirdCumulantFormula {
        self.formula
    }

    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl Default for CumulantOptions {
    fn default() -> Self {
        Self {
            h_max: DEFAULT_H_MAX,
            strategy: ExecutionStrategy::Parallel,
            trend: TrendConvention::Reference,
            formula: ThirdCumulantFormula::Reference,
        }
    }
}

/// Validate a bandwidth: finite and strictly positive.
///
/// # Errors
/// [`CumulantError::InvalidBandwidth`] with the offending value.
pub fn verify_bandwidth(h: f64) -> CumulantResult<()> {
    if !h.is_finite() {
        return Err(CumulantError::InvalidBandwidth {
            value: h,
            reason: "Bandwidth must be finite.",
        });
    }
    if h <= 0.0 {
        return Err(CumulantError::InvalidBandwidth {
            value: h,
            reason: "Bandwidth must be positive.",
        });
    }
    Ok(())
}
