//! Shared simulation support for the integration suites.
//!
//! Purpose
//! -------
//! Draw reproducible event sequences for statistical end-to-end tests:
//! homogeneous Poisson processes and multivariate Hawkes processes with
//! exponential kernels, simulated through their cluster (branching)
//! representation.
//!
//! Conventions
//! -----------
//! - `branching[i][j]` is the mean number of type-`i` children of one
//!   type-`j` event, i.e. the kernel integral `G_ij`; the matching
//!   kernel-integral matrix is `R = (I − G)⁻¹`.
//! - Every generator takes an explicit seed; no global RNG is used.
#![allow(dead_code)]

use ndarray::{array, Array2};
use rand::{distributions::Distribution, rngs::StdRng, SeedableRng};
use statrs::distribution::Exp;

/// Sorted arrival times of a rate-`rate` Poisson process on `[0, horizon)`.
pub fn poisson_process(rng: &mut StdRng, rate: f64, horizon: f64) -> Vec<f64> {
    let gaps = Exp::new(rate).expect("positive rate");
    let mut times = Vec::new();
    let mut t = gaps.sample(rng);
    while t < horizon {
        times.push(t);
        t += gaps.sample(rng);
    }
    times
}

/// Number of unit-rate arrivals before `mean`, i.e. a Poisson(`mean`) draw.
fn poisson_count(rng: &mut StdRng, unit: &Exp, mean: f64) -> usize {
    let mut n = 0;
    let mut s = unit.sample(rng);
    while s < mean {
        n += 1;
        s += unit.sample(rng);
    }
    n
}

/// Cluster simulation of a Hawkes process with kernels
/// `φ_ij(t) = G_ij·β·e^{−βt}` and baselines `mu`, truncated to
/// `[0, horizon)`.
pub fn hawkes_process(
    seed: u64, mu: &[f64], branching: &Array2<f64>, decay: f64, horizon: f64,
) -> Vec<Vec<f64>> {
    let dim = mu.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let unit = Exp::new(1.0).expect("unit rate");
    let delay = Exp::new(decay).expect("positive decay");

    let mut pending: Vec<(usize, f64)> = Vec::new();
    for (i, &rate) in mu.iter().enumerate() {
        pending.extend(poisson_process(&mut rng, rate, horizon).into_iter().map(|t| (i, t)));
    }

    let mut events = vec![Vec::new(); dim];
    while let Some((j, t)) = pending.pop() {
        events[j].push(t);
        for i in 0..dim {
            for _ in 0..poisson_count(&mut rng, &unit, branching[[i, j]]) {
                let child = t + delay.sample(&mut rng);
                if child < horizon {
                    pending.push((i, child));
                }
            }
        }
    }
    for seq in &mut events {
        seq.sort_by(f64::total_cmp);
    }
    events
}

/// Independent Poisson sequences, one per rate.
pub fn independent_poisson(seed: u64, rates: &[f64], horizon: f64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    rates.iter().map(|&rate| poisson_process(&mut rng, rate, horizon)).collect()
}

/// Reference 2-D model: baselines, branching matrix, decay.
pub fn reference_model() -> (Vec<f64>, Array2<f64>, f64) {
    (vec![0.5, 0.4], array![[0.3, 0.1], [0.2, 0.25]], 1.0)
}

/// `(I − G)⁻¹` for a 2 × 2 branching matrix.
pub fn kernel_integrals_2d(branching: &Array2<f64>) -> Array2<f64> {
    let (a, b) = (1.0 - branching[[0, 0]], -branching[[0, 1]]);
    let (c, d) = (-branching[[1, 0]], 1.0 - branching[[1, 1]]);
    let det = a * d - b * c;
    array![[d / det, -b / det], [-c / det, a / det]]
}

/// Frobenius norm of `a − b` relative to the norm of `b`.
pub fn relative_error(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    let diff = (a - b).mapv(|x| x * x).sum().sqrt();
    diff / b.mapv(|x| x * x).sum().sqrt()
}
