//! Windowed pairwise and triple-wise statistics over sorted timestamps.
//!
//! Purpose
//! -------
//! Provide the three scan kernels every integrated cumulant is assembled
//! from. Each kernel walks the anchor sequence once, maintaining monotone
//! pointers into the target sequence(s), so a call is `O(n_anchor + n_target)`.
//!
//! Key behaviors
//! -------------
//! - [`window_count`] (`A_ij`): mean centered count of target events inside
//!   `(τ + a, τ + b)` around every anchor `τ`.
//! - [`window_product`] (`E_ijk`): mean product of two centered window counts
//!   around anchors from a third sequence.
//! - [`lag_integral`] (`I_ij`): mean of `τ − τ'` over target events
//!   `τ' ∈ (τ − H, τ)`, minus its Poisson trend `½·H²·L_i·L_j`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are sorted ascending (guaranteed by
//!   [`EventSequence`](crate::process::EventSequence)).
//! - Pointers are never rewound; their value after advancing equals the number
//!   of target events below the current threshold.
//! - Anchors whose window starts before time zero are skipped.
//! - Boundary anchors (window touching the first or last target event) are
//!   not admissible; when some anchors are dropped the sum is rescaled by
//!   `n_anchor / admissible`.
//! - A zero horizon yields a normalised sum of exactly `0.0`.
//!
//! Conventions
//! -----------
//! - Window bounds `a < b` are offsets relative to the anchor; the start is
//!   exclusive (`z > τ + a`) and the end is exclusive (`z < τ + b`).
//! - Kernels are pure functions of borrowed slices and are safe to call
//!   concurrently from the parallel strategy.
use crate::cumulants::options::TrendConvention;

/// One marginal of the process as seen by a kernel: timestamps and their
/// average intensity.
#[derive(Debug, Clone, Copy)]
pub struct Marginal<'a> {
    pub times: &'a [f64],
    pub intensity: f64,
}

impl<'a> Marginal<'a> {
    pub fn new(times: &'a [f64], intensity: f64) -> Self {
        Self { times, intensity }
    }

    fn len(&self) -> usize {
        self.times.len()
    }
}

/// `A_ij`: centered window count of `target` around each `anchor` event.
///
/// Computes
/// `(1/T) Σ_{τ ∈ anchor} (N_target(τ + b) − N_target(τ + a)) − (b − a)·L_i·L_j`
/// over admissible anchors, rescaled for dropped anchors.
///
/// Returns exactly `0.0 − (b − a)·L_i·L_j` when no anchor is admissible or
/// `horizon == 0`; with an empty target this is `0.0`.
pub fn window_count(
    anchor: Marginal<'_>, target: Marginal<'_>, a: f64, b: f64, horizon: f64,
) -> f64 {
    let z = target.times;
    let n_target = target.len();
    let mut u = 0usize;
    let mut sum = 0.0;
    let mut count = 0usize;

    for &tau in anchor.times {
        if tau + a < 0.0 {
            continue;
        }
        u = advance_while(z, u, |t| t <= tau + a);
        if u == n_target {
            continue;
        }
        let v = advance_while(z, u, |t| t < tau + b);
        if v < n_target && u > 0 {
            count += 1;
            sum += (v - u) as f64;
        }
    }

    normalise(rescale(sum, count, anchor.len()), horizon)
        - (b - a) * anchor.intensity * target.intensity
}

/// `E_ijk`: centered product of the window counts of `first` and `second`
/// around each `anchor` event.
///
/// Both counts are centered by a per-anchor trend; `trend` selects whether the
/// first count is centered with `L_second·(b − a)` ([`TrendConvention::Reference`])
/// or with `L_first·(b − a)` ([`TrendConvention::Corrected`]). The second count
/// is always centered with `L_second·(b − a)`.
pub fn window_product(
    first: Marginal<'_>, second: Marginal<'_>, anchor: Marginal<'_>, a: f64, b: f64,
    horizon: f64, trend: TrendConvention,
) -> f64 {
    let width = b - a;
    let trend_first = match trend {
        TrendConvention::Reference => second.intensity * width,
        TrendConvention::Corrected => first.intensity * width,
    };
    let trend_second = second.intensity * width;

    let (zi, zj) = (first.times, second.times);
    let (n_i, n_j) = (zi.len(), zj.len());
    let (mut u, mut x) = (0usize, 0usize);
    let mut sum = 0.0;
    let mut count = 0usize;

    for &tau in anchor.times {
        if tau + a < 0.0 {
            continue;
        }
        u = advance_while(zi, u, |t| t <= tau + a);
        let v = advance_while(zi, u, |t| t < tau + b);
        x = advance_while(zj, x, |t| t <= tau + a);
        let y = advance_while(zj, x, |t| t < tau + b);

        if y < n_j && x > 0 && v < n_i && u > 0 {
            count += 1;
            sum += ((v - u) as f64 - trend_first) * ((y - x) as f64 - trend_second);
        }
    }

    normalise(rescale(sum, count, anchor.len()), horizon)
}

/// `I_ij`: integrated lag intensity `∫_0^H t·c_ij(t) dt`.
///
/// Sums `τ − τ'` over every target event `τ' ∈ (τ − H, τ)` for anchors with
/// `τ ≥ H`, then subtracts `½·H²·L_i·L_j`. The admissible count is per pair,
/// and the rescaling uses it the same way as the other kernels.
pub fn lag_integral(
    anchor: Marginal<'_>, target: Marginal<'_>, bandwidth: f64, horizon: f64,
) -> f64 {
    let z = target.times;
    let mut u = 0usize;
    let mut sum = 0.0;
    let mut count = 0usize;

    for &tau in anchor.times {
        let start = tau - bandwidth;
        if start < 0.0 {
            continue;
        }
        u = advance_while(z, u, |t| t <= start);
        for &t in z[u..].iter().take_while(|&&t| tau - t > 0.0) {
            sum += tau - t;
            count += 1;
        }
    }

    normalise(rescale(sum, count, anchor.len()), horizon)
        - 0.5 * bandwidth * bandwidth * anchor.intensity * target.intensity
}

/// First index `>= start` whose value fails `keep`, or `z.len()`.
fn advance_while(z: &[f64], start: usize, keep: impl Fn(f64) -> bool) -> usize {
    let mut idx = start;
    while idx < z.len() && keep(z[idx]) {
        idx += 1;
    }
    idx
}

/// Scale `sum` by `n / count` when only part of the anchors were admissible.
fn rescale(sum: f64, count: usize, n: usize) -> f64 {
    if count > 0 && count < n {
        sum * n as f64 / count as f64
    } else {
        sum
    }
}

fn normalise(sum: f64, horizon: f64) -> f64 {
    if horizon == 0.0 {
        0.0
    } else {
        sum / horizon
    }
}
