//! Property tests for the windowed statistic kernels.
//!
//! Each kernel is compared against a direct nested-loop evaluation of the
//! same counting rule over random sorted timestamp sets: counts are taken
//! by filtering the whole target sequence for every anchor, with no
//! pointer reuse.
use hawkes_cumulants::{
    cumulants::{
        kernels::{lag_integral, window_count, window_product, Marginal},
        options::TrendConvention,
    },
    process::ProcessCollection,
};
use proptest::prelude::*;

fn normalised(sum: f64, count: usize, n: usize, horizon: f64) -> f64 {
    let sum = if count > 0 && count < n { sum * n as f64 / count as f64 } else { sum };
    if horizon == 0.0 {
        0.0
    } else {
        sum / horizon
    }
}

fn at_or_below(z: &[f64], x: f64) -> usize {
    z.iter().filter(|&&t| t <= x).count()
}

fn strictly_below(z: &[f64], x: f64) -> usize {
    z.iter().filter(|&&t| t < x).count()
}

fn brute_window_count(
    anchor: Marginal<'_>, target: Marginal<'_>, a: f64, b: f64, t: f64,
) -> f64 {
    let n = target.times.len();
    let (mut sum, mut count) = (0.0, 0);
    for &tau in anchor.times {
        if tau + a < 0.0 {
            continue;
        }
        let u = at_or_below(target.times, tau + a);
        let v = strictly_below(target.times, tau + b).max(u);
        if u > 0 && u < n && v < n {
            sum += (v - u) as f64;
            count += 1;
        }
    }
    normalised(sum, count, anchor.times.len(), t) - (b - a) * anchor.intensity * target.intensity
}

fn brute_window_product(
    first: Marginal<'_>, second: Marginal<'_>, anchor: Marginal<'_>, a: f64, b: f64, t: f64,
) -> f64 {
    let trend = second.intensity * (b - a);
    let (mut sum, mut count) = (0.0, 0);
    for &tau in anchor.times {
        if tau + a < 0.0 {
            continue;
        }
        let u = at_or_below(first.times, tau + a);
        let v = strictly_below(first.times, tau + b).max(u);
        let x = at_or_below(second.times, tau + a);
        let y = strictly_below(second.times, tau + b).max(x);
        if u > 0 && v < first.times.len() && x > 0 && y < second.times.len() {
            sum += ((v - u) as f64 - trend) * ((y - x) as f64 - trend);
            count += 1;
        }
    }
    normalised(sum, count, anchor.times.len(), t)
}

fn brute_lag_integral(anchor: Marginal<'_>, target: Marginal<'_>, h: f64, t: f64) -> f64 {
    let (mut sum, mut count) = (0.0, 0);
    for &tau in anchor.times {
        if tau - h < 0.0 {
            continue;
        }
        for &s in target.times.iter().filter(|&&s| s > tau - h && s < tau) {
            sum += tau - s;
            count += 1;
        }
    }
    normalised(sum, count, anchor.times.len(), t)
        - 0.5 * h * h * anchor.intensity * target.intensity
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn sorted_times() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..60.0, 0..40).prop_map(|mut v| {
        v.sort_by(f64::total_cmp);
        v
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn window_count_matches_nested_loops(
        zi in sorted_times(),
        zj in sorted_times(),
        h in 0.1f64..15.0,
    ) {
        let process = ProcessCollection::from_vecs(vec![zi, zj]).unwrap();
        let l = process.intensities();
        let t = process.horizon();
        let ni = Marginal::new(process.sequences()[0].as_slice(), l[0]);
        let nj = Marginal::new(process.sequences()[1].as_slice(), l[1]);

        let fast = window_count(ni, nj, -h, h, t);
        let slow = brute_window_count(ni, nj, -h, h, t);
        prop_assert!(close(fast, slow), "A: scan {} vs nested {}", fast, slow);
    }

    #[test]
    fn window_product_matches_nested_loops(
        zi in sorted_times(),
        zj in sorted_times(),
        zk in sorted_times(),
        h in 0.1f64..15.0,
    ) {
        let process = ProcessCollection::from_vecs(vec![zi, zj, zk]).unwrap();
        let l = process.intensities();
        let t = process.horizon();
        let seqs = process.sequences();
        let ni = Marginal::new(seqs[0].as_slice(), l[0]);
        let nj = Marginal::new(seqs[1].as_slice(), l[1]);
        let nk = Marginal::new(seqs[2].as_slice(), l[2]);

        let fast = window_product(ni, nj, nk, -h, h, t, TrendConvention::Reference);
        let slow = brute_window_product(ni, nj, nk, -h, h, t);
        prop_assert!(close(fast, slow), "E: scan {} vs nested {}", fast, slow);
    }

    #[test]
    fn lag_integral_matches_nested_loops(
        zi in sorted_times(),
        zj in sorted_times(),
        h in 0.1f64..15.0,
    ) {
        let process = ProcessCollection::from_vecs(vec![zi, zj]).unwrap();
        let l = process.intensities();
        let t = process.horizon();
        let ni = Marginal::new(process.sequences()[0].as_slice(), l[0]);
        let nj = Marginal::new(process.sequences()[1].as_slice(), l[1]);

        let fast = lag_integral(ni, nj, h, t);
        let slow = brute_lag_integral(ni, nj, h, t);
        prop_assert!(close(fast, slow), "I: scan {} vs nested {}", fast, slow);
    }

    #[test]
    fn window_count_with_empty_target_is_zero(
        zi in sorted_times(),
        h in 0.1f64..15.0,
    ) {
        let process = ProcessCollection::from_vecs(vec![zi, Vec::new()]).unwrap();
        let l = process.intensities();
        let ni = Marginal::new(process.sequences()[0].as_slice(), l[0]);
        let empty = Marginal::new(process.sequences()[1].as_slice(), l[1]);

        prop_assert_eq!(window_count(ni, empty, -h, h, process.horizon()), 0.0);
    }
}
