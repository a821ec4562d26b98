//! Hull Moving Average.
//!
//! HMA(n) = WMA(2*WMA(n/2) - WMA(n), floor(sqrt(n)))
//!
//! Built from the two WMA series the engine already caches.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::rolling_wma;
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 20;

pub fn half_period(period: usize) -> usize {
    (period / 2).max(1)
}

pub fn sqrt_period(period: usize) -> usize {
    ((period as f64).sqrt() as usize).max(1)
}

pub fn calculate_hma(
    bars: &[Bar],
    period: usize,
    wma_half: &IndicatorSeries,
    wma_full: &IndicatorSeries,
) -> IndicatorSeries {
    let raw: Vec<Option<f64>> = (0..bars.len())
        .map(|i| Some(2.0 * wma_half.value(i)? - wma_full.value(i)?))
        .collect();
    IndicatorSeries::from_options(
        IndicatorType::Hma(period),
        bars,
        rolling_wma(&raw, sqrt_period(period)),
    )
}
