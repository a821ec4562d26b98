//! Ehlers Fisher transform of the close.
//!
//! x[i]  = 0.66 * ((C - LL(n)) / (HH(n) - LL(n)) - 0.5) + 0.67 * x[i-1], clamped to ±0.999
//! F[i]  = 0.5 * ln((1 + x) / (1 - x)) + 0.5 * F[i-1]
//!
//! A flat window contributes a zero position. Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{rolling_max, rolling_min};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 10;
const CLAMP: f64 = 0.999;

pub fn calculate_fisher(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let hh = rolling_max(&closes, period);
    let ll = rolling_min(&closes, period);

    let mut x = 0.0;
    let mut fisher = 0.0;
    let values = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let (hh, ll) = (hh[i]?, ll[i]?);
            let range = hh - ll;
            let position = if range == 0.0 {
                0.0
            } else {
                (close - ll) / range - 0.5
            };
            x = (0.66 * position + 0.67 * x).clamp(-CLAMP, CLAMP);
            fisher = 0.5 * ((1.0 + x) / (1.0 - x)).ln() + 0.5 * fisher;
            Some(fisher)
        })
        .collect();

    IndicatorSeries::from_options(IndicatorType::Fisher(period), bars, values)
}
