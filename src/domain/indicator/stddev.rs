//! Standard Deviation indicator.
//!
//! Population standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::rolling_stddev;
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 20;

pub fn calculate_stddev(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close)).collect();
    IndicatorSeries::from_options(
        IndicatorType::Stddev(period),
        bars,
        rolling_stddev(&closes, period),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::flat_bars;
    use approx::assert_relative_eq;

    #[test]
    fn stddev_warmup() {
        let bars = flat_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_stddev(&bars, 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
    }

    #[test]
    fn stddev_constant_prices() {
        let series = calculate_stddev(&flat_bars(&[100.0; 5]), 3);
        for i in 2..5 {
            assert!(series.value(i).unwrap().abs() < 1e-6);
        }
    }

    #[test]
    fn stddev_known_values() {
        let bars = flat_bars(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let series = calculate_stddev(&bars, 8);
        assert_relative_eq!(series.value(7).unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn stddev_sliding_window() {
        let bars = flat_bars(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_stddev(&bars, 2);
        // each adjacent pair differs by 10 → population stddev 5
        for i in 1..4 {
            assert_relative_eq!(series.value(i).unwrap(), 5.0, epsilon = 1e-9);
        }
    }
}
