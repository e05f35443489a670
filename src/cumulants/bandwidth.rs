//! Per-pair bandwidth heuristics.
//!
//! [`BandwidthRule::Uniform`] uses the session `h_max` for every pair.
//! [`BandwidthRule::MinimizeLagIntegral`] scans a log-spaced grid on
//! `[1e-3, 1e3]` and keeps, for each pair, the bandwidth minimising
//! `I(N_i, N_j, h) / h`; ties resolve to the smallest grid point.
use ndarray::Array2;

use crate::cumulants::{
    errors::{CumulantError, CumulantResult},
    kernels::{lag_integral, Marginal},
    options::CumulantOptions,
    strategy::fill_pairs,
};

/// Default grid size for [`BandwidthRule::MinimizeLagIntegral`].
pub const DEFAULT_GRID_SIZE: usize = 1000;

const GRID_LOG10_MIN: f64 = -3.0;
const GRID_LOG10_MAX: f64 = 3.0;

/// Bandwidth selection heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandwidthRule {
    #[default]
    Uniform,
    MinimizeLagIntegral { grid_size: usize },
}

impl BandwidthRule {
    /// Build the `d × d` bandwidth matrix.
    ///
    /// # Errors
    /// [`CumulantError::InvalidGridSize`] when `grid_size == 0`.
    pub fn select(
        &self, marginals: &[Marginal<'_>], horizon: f64, options: CumulantOptions,
    ) -> CumulantResult<Array2<f64>> {
        let dim = marginals.len();
        match *self {
            BandwidthRule::Uniform => Ok(Array2::from_elem((dim, dim), options.h_max())),
            BandwidthRule::MinimizeLagIntegral { grid_size } => {
                let grid = log_grid(grid_size)?;
                Ok(fill_pairs(dim, options.strategy(), |i, j| {
                    let mut best = (grid[0], f64::INFINITY);
                    for &h in &grid {
                        let score = lag_integral(marginals[i], marginals[j], h, horizon) / h;
                        if score < best.1 {
                            best = (h, score);
                        }
                    }
                    best.0
                }))
            }
        }
    }
}

/// `grid_size` points evenly spaced in `log10` between the grid bounds; a
/// single point sits at the lower bound.
pub fn log_grid(grid_size: usize) -> CumulantResult<Vec<f64>> {
    match grid_size {
        0 => Err(CumulantError::InvalidGridSize { size: 0 }),
        1 => Ok(vec![10f64.powf(GRID_LOG10_MIN)]),
        n => {
            let step = (GRID_LOG10_MAX - GRID_LOG10_MIN) / (n - 1) as f64;
            Ok((0..n).map(|k| 10f64.powf(GRID_LOG10_MIN + step * k as f64)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cumulants::options::ExecutionStrategy;

    #[test]
    // Purpose
    // -------
    // The grid spans `[1e-3, 1e3]` and rejects size zero.
    //
    // Given
    // -----
    // - Sizes 0, 1, 7.
    //
    // Expect
    // ------
    // - Error, `[1e-3]`, and seven decades-spaced points ending at `1e3`.
    fn log_grid_spans_six_decades() {
        assert_eq!(log_grid(0).unwrap_err(), CumulantError::InvalidGridSize { size: 0 });
        assert_eq!(log_grid(1).unwrap().len(), 1);
        assert!((log_grid(1).unwrap()[0] - 1e-3).abs() < 1e-15);

        let grid = log_grid(7).unwrap();
        assert_eq!(grid.len(), 7);
        assert!((grid[0] - 1e-3).abs() < 1e-15);
        assert!((grid[3] - 1.0).abs() < 1e-12);
        assert!((grid[6] - 1e3).abs() < 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // Uniform selection fills the matrix with `h_max`.
    //
    // Given
    // -----
    // - Two marginals, `h_max = 7`.
    //
    // Expect
    // ------
    // - A 2 × 2 matrix of sevens.
    fn uniform_rule_repeats_session_bandwidth() {
        let times = [0.0, 1.0, 2.0];
        let marginals = [Marginal::new(&times, 1.0), Marginal::new(&times, 1.0)];
        let options = CumulantOptions::new(7.0, ExecutionStrategy::Sequential).unwrap();

        let h = BandwidthRule::Uniform.select(&marginals, 2.0, options).unwrap();

        assert_eq!(h, Array2::from_elem((2, 2), 7.0));
    }

    #[test]
    // Purpose
    // -------
    // Lag-integral minimisation picks grid points and is symmetric in
    // strategy.
    //
    // Given
    // -----
    // - Two short sequences, a 25-point grid.
    //
    // Expect
    // ------
    // - Every entry lies on the grid; both strategies agree.
    fn lag_integral_rule_selects_grid_points() {
        let a = [0.2, 0.9, 1.4, 2.8, 3.3, 5.0, 6.1];
        let b = [0.1, 1.0, 2.2, 2.6, 4.1, 5.5, 6.3];
        let marginals = [Marginal::new(&a, 7.0 / 6.2), Marginal::new(&b, 7.0 / 6.2)];
        let rule = BandwidthRule::MinimizeLagIntegral { grid_size: 25 };
        let sequential = CumulantOptions::new(1.0, ExecutionStrategy::Sequential).unwrap();
        let parallel = sequential.with_strategy(ExecutionStrategy::Parallel);

        let h_seq = rule.select(&marginals, 6.2, sequential).unwrap();
        let h_par = rule.select(&marginals, 6.2, parallel).unwrap();

        let grid = log_grid(25).unwrap();
        assert_eq!(h_seq, h_par);
        assert!(h_seq.iter().all(|h| grid.contains(h)));
    }
}
