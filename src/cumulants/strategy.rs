//! Dispatch of per-pair statistics over the `d × d` index space.
//!
//! Every stage of the cumulant engine evaluates one independent scalar per
//! ordered pair `(i, j)`. [`fill_pairs`] runs that evaluation either on the
//! calling thread or on the rayon pool. The parallel path maps the flat index
//! `0..d²`, collects the results in index order and reshapes them row-major,
//! so both strategies return identical arrays.
use ndarray::Array2;
use rayon::prelude::*;

use crate::cumulants::options::ExecutionStrategy;

/// Evaluate `entry(i, j)` for every ordered pair and return the `d × d` array.
pub fn fill_pairs<F>(dim: usize, strategy: ExecutionStrategy, entry: F) -> Array2<f64>
where
    F: Fn(usize, usize) -> f64 + Sync + Send,
{
    match strategy {
        ExecutionStrategy::Sequential => Array2::from_shape_fn((dim, dim), |(i, j)| entry(i, j)),
        ExecutionStrategy::Parallel => {
            let flat: Vec<f64> =
                (0..dim * dim).into_par_iter().map(|idx| entry(idx / dim, idx % dim)).collect();
            Array2::from_shape_fn((dim, dim), |(i, j)| flat[i * dim + j])
        }
    }
}

/// Like [`fill_pairs`] for statistics producing two values per pair.
pub fn fill_pair_tuples<F>(
    dim: usize, strategy: ExecutionStrategy, entry: F,
) -> (Array2<f64>, Array2<f64>)
where
    F: Fn(usize, usize) -> (f64, f64) + Sync + Send,
{
    let flat: Vec<(f64, f64)> = match strategy {
        ExecutionStrategy::Sequential => {
            (0..dim * dim).map(|idx| entry(idx / dim, idx % dim)).collect()
        }
        ExecutionStrategy::Parallel => {
            (0..dim * dim).into_par_iter().map(|idx| entry(idx / dim, idx % dim)).collect()
        }
    };
    let first = Array2::from_shape_fn((dim, dim), |(i, j)| flat[i * dim + j].0);
    let second = Array2::from_shape_fn((dim, dim), |(i, j)| flat[i * dim + j].1);
    (first, second)
}

/// Replace `m` with `½(m + mᵀ)`.
pub fn symmetrize(m: &mut Array2<f64>) {
    let transposed = m.t().to_owned();
    *m += &transposed;
    *m *= 0.5;
}
