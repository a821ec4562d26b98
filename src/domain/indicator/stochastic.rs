//! Stochastic oscillator %K.
//!
//! %K = 100 * (C - LL(n)) / (HH(n) - LL(n))
//!
//! A flat window (HH == LL) has no defined position and is left invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{rolling_max, rolling_min};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_stochastic_k(bars: &[Bar], period: usize) -> IndicatorSeries {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let hh = rolling_max(&highs, period);
    let ll = rolling_min(&lows, period);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let (hh, ll) = (hh[i]?, ll[i]?);
            let range = hh - ll;
            (range != 0.0).then(|| 100.0 * (bar.close - ll) / range)
        })
        .collect();

    IndicatorSeries::from_options(IndicatorType::StochasticK(period), bars, values)
}
