//! Williams %R: -100 * (HH(n) - C) / (HH(n) - LL(n)), in [-100, 0].
//! A flat window is left invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{rolling_max, rolling_min};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_williams_r(bars: &[Bar], period: usize) -> IndicatorSeries {
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
            (range != 0.0).then(|| -100.0 * (hh - bar.close) / range)
        })
        .collect();

    IndicatorSeries::from_options(IndicatorType::WilliamsR(period), bars, values)
}
