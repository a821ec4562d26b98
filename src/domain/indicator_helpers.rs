//! Shared rolling-window helpers for indicator calculations.
//!
//! Each helper takes a source series where `None` marks a missing input and
//! returns a series of the same length. A `None` input restarts the window,
//! so a helper applied to another indicator's output warms up after that
//! indicator does. All helpers update in O(1) per bar.

use std::collections::VecDeque;

/// Simple mean over the last `period` values.
pub fn rolling_mean(source: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(source.len());
    if period == 0 {
        out.resize(source.len(), None);
        return out;
    }

    let mut sum = 0.0;
    let mut run = 0usize;
    for (i, value) in source.iter().enumerate() {
        let Some(x) = *value else {
            sum = 0.0;
            run = 0;
            out.push(None);
            continue;
        };
        sum += x;
        run += 1;
        if run > period {
            sum -= source[i - period].unwrap_or(0.0);
        }
        out.push((run >= period).then(|| sum / period as f64));
    }
    out
}

/// Population standard deviation over the last `period` values.
///
/// Keeps a sliding mean and sum of squared deviations (Welford), so large
/// prices with a small spread do not cancel out. Rounding can still leave the
/// squared sum fractionally below zero on flat input, so it is clamped.
pub fn rolling_stddev(source: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(source.len());
    if period == 0 {
        out.resize(source.len(), None);
        return out;
    }

    let n = period as f64;
    let mut mean = 0.0;
    let mut m2 = 0.0;
    let mut run = 0usize;
    for (i, value) in source.iter().enumerate() {
        let Some(x) = *value else {
            mean = 0.0;
            m2 = 0.0;
            run = 0;
            out.push(None);
            continue;
        };
        run += 1;
        if run <= period {
            let delta = x - mean;
            mean += delta / run as f64;
            m2 += delta * (x - mean);
        } else {
            let old = source[i - period].unwrap_or(0.0);
            let prev_mean = mean;
            mean += (x - old) / n;
            m2 += (x - old) * (x - mean + old - prev_mean);
        }
        out.push((run >= period).then(|| (m2 / n).max(0.0).sqrt()));
    }
    out
}

/// Linearly weighted mean; the newest value has weight `period`.
pub fn rolling_wma(source: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(source.len());
    if period == 0 {
        out.resize(source.len(), None);
        return out;
    }

    let denominator = period as f64 * (period as f64 + 1.0) / 2.0;
    let mut total = 0.0;
    let mut numerator = 0.0;
    let mut run = 0usize;
    for (i, value) in source.iter().enumerate() {
        let Some(x) = *value else {
            total = 0.0;
            numerator = 0.0;
            run = 0;
            out.push(None);
            continue;
        };
        run += 1;
        if run <= period {
            numerator += run as f64 * x;
            total += x;
        } else {
            // Shifting the window lowers every weight by one.
            numerator = numerator - total + period as f64 * x;
            total = total + x - source[i - period].unwrap_or(0.0);
        }
        out.push((run >= period).then(|| numerator / denominator));
    }
    out
}

/// EMA with k = 2/(n+1), seeded with the SMA of the first `period` values.
pub fn rolling_ema(source: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let k = 2.0 / (period as f64 + 1.0);
    smoothed(source, period, |prev, x| x * k + prev * (1.0 - k))
}

/// Wilder's smoothing: seed with the SMA, then (prev·(n-1) + x) / n.
pub fn wilder(source: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let n = period as f64;
    smoothed(source, period, |prev, x| (prev * (n - 1.0) + x) / n)
}

fn smoothed(
    source: &[Option<f64>],
    period: usize,
    step: impl Fn(f64, f64) -> f64,
) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(source.len());
    if period == 0 {
        out.resize(source.len(), None);
        return out;
    }

    let mut seed_sum = 0.0;
    let mut run = 0usize;
    let mut current = 0.0;
    for value in source {
        let Some(x) = *value else {
            seed_sum = 0.0;
            run = 0;
            out.push(None);
            continue;
        };
        run += 1;
        if run < period {
            seed_sum += x;
            out.push(None);
        } else if run == period {
            current = (seed_sum + x) / period as f64;
            out.push(Some(current));
        } else {
            current = step(current, x);
            out.push(Some(current));
        }
    }
    out
}

/// Highest value over the last `period` entries (monotonic deque).
pub fn rolling_max(source: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_extreme(source, period, |candidate, kept| candidate >= kept)
}

/// Lowest value over the last `period` entries (monotonic deque).
pub fn rolling_min(source: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_extreme(source, period, |candidate, kept| candidate <= kept)
}

fn rolling_extreme(
    source: &[f64],
    period: usize,
    dominates: impl Fn(f64, f64) -> bool,
) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(source.len());
    if period == 0 {
        out.resize(source.len(), None);
        return out;
    }

    let mut window: VecDeque<usize> = VecDeque::with_capacity(period.min(source.len()));
    for (i, &x) in source.iter().enumerate() {
        while window.back().is_some_and(|&j| dominates(x, source[j])) {
            window.pop_back();
        }
        window.push_back(i);
        if window.front().is_some_and(|&j| i - j >= period) {
            window.pop_front();
        }
        let extreme = window.front().map(|&j| source[j]);
        out.push(if i + 1 >= period { extreme } else { None });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn naive_mean(values: &[f64], i: usize, period: usize) -> f64 {
        values[i + 1 - period..=i].iter().sum::<f64>() / period as f64
    }

    #[test]
    fn mean_warmup_and_values() {
        let out = rolling_mean(&some(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_relative_eq!(out[2].unwrap(), 2.0);
        assert_relative_eq!(out[3].unwrap(), 3.0);
    }

    #[test]
    fn mean_restarts_after_gap() {
        let out = rolling_mean(&[None, Some(2.0), Some(4.0), Some(6.0)], 2);
        assert_eq!(out, vec![None, None, Some(3.0), Some(5.0)]);
    }

    #[test]
    fn mean_matches_naive_window() {
        let values: Vec<f64> = (0..50).map(|i| ((i * 37) % 11) as f64 + 0.5).collect();
        let out = rolling_mean(&some(&values), 7);
        for i in 6..values.len() {
            assert_relative_eq!(out[i].unwrap(), naive_mean(&values, i, 7), epsilon = 1e-9);
        }
    }

    #[test]
    fn stddev_flat_input_is_zero() {
        let out = rolling_stddev(&some(&[100.0; 10]), 4);
        for v in out.iter().skip(3) {
            assert!(v.unwrap() >= 0.0);
            assert!(v.unwrap() < 1e-6);
        }
    }

    #[test]
    fn stddev_known_value() {
        // population stddev of [2,4,4,4,5,5,7,9] is 2
        let out = rolling_stddev(&some(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 8);
        assert_relative_eq!(out[7].unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn stddev_holds_precision_on_large_prices() {
        // every window is a permutation of base + {0, 1, 2}
        let values: Vec<f64> = (0..60).map(|i| 1e9 + (i % 3) as f64).collect();
        let out = rolling_stddev(&some(&values), 3);
        let expected = (2.0f64 / 3.0).sqrt();
        for v in out.iter().skip(2) {
            assert_relative_eq!(v.unwrap(), expected, epsilon = 1e-4);
        }
    }

    #[test]
    fn stddev_matches_two_pass_window() {
        let values: Vec<f64> = (0..80).map(|i| 250.0 + ((i * 13) % 17) as f64 * 0.37).collect();
        let out = rolling_stddev(&some(&values), 9);
        for i in 8..values.len() {
            let mean = naive_mean(&values, i, 9);
            let var = values[i - 8..=i].iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 9.0;
            assert_relative_eq!(out[i].unwrap(), var.sqrt(), epsilon = 1e-9);
        }
    }

    #[test]
    fn wma_matches_weighted_sum() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        let out = rolling_wma(&some(&values), 3);
        assert_eq!(out[1], None);
        // (10*1 + 20*2 + 30*3) / 6
        assert_relative_eq!(out[2].unwrap(), 140.0 / 6.0);
        // (20*1 + 30*2 + 40*3) / 6
        assert_relative_eq!(out[3].unwrap(), 200.0 / 6.0);
        assert_relative_eq!(out[4].unwrap(), 260.0 / 6.0);
    }

    #[test]
    fn ema_seed_is_sma() {
        let out = rolling_ema(&some(&[10.0, 20.0, 30.0, 40.0]), 3);
        assert_eq!(out[1], None);
        assert_relative_eq!(out[2].unwrap(), 20.0);
        assert_relative_eq!(out[3].unwrap(), 40.0 * 0.5 + 20.0 * 0.5);
    }

    #[test]
    fn wilder_recursion() {
        let out = wilder(&some(&[1.0, 3.0, 5.0]), 2);
        assert_relative_eq!(out[1].unwrap(), 2.0);
        assert_relative_eq!(out[2].unwrap(), (2.0 + 5.0) / 2.0);
    }

    #[test]
    fn max_and_min_windows() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let highs = rolling_max(&values, 3);
        let lows = rolling_min(&values, 3);
        assert_eq!(highs[1], None);
        assert_eq!(highs[2], Some(4.0));
        assert_eq!(highs[3], Some(4.0));
        assert_eq!(highs[6], Some(9.0));
        assert_eq!(highs[7], Some(9.0));
        assert_eq!(lows[2], Some(1.0));
        assert_eq!(lows[5], Some(1.0));
        assert_eq!(lows[7], Some(2.0));
    }

    #[test]
    fn oversized_period_is_never_valid() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let opts = some(&values);
        for period in [usize::MAX, usize::MAX / 2, 5_000_000_000] {
            assert!(rolling_mean(&opts, period).iter().all(|v| v.is_none()));
            assert!(rolling_stddev(&opts, period).iter().all(|v| v.is_none()));
            assert!(rolling_wma(&opts, period).iter().all(|v| v.is_none()));
            assert!(rolling_ema(&opts, period).iter().all(|v| v.is_none()));
            assert!(wilder(&opts, period).iter().all(|v| v.is_none()));
            assert!(rolling_max(&values, period).iter().all(|v| v.is_none()));
            assert!(rolling_min(&values, period).iter().all(|v| v.is_none()));
        }
    }

    #[test]
    fn zero_period_is_never_valid() {
        assert!(rolling_mean(&some(&[1.0, 2.0]), 0).iter().all(|v| v.is_none()));
        assert!(rolling_max(&[1.0, 2.0], 0).iter().all(|v| v.is_none()));
        assert!(rolling_ema(&some(&[1.0, 2.0]), 0).iter().all(|v| v.is_none()));
    }
}
