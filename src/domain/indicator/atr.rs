//! Average True Range.
//!
//! TR[0] = H - L, TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! ATR is Wilder-smoothed TR, seeded with the mean of the first n values.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::price::true_range_values;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::wilder;
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_atr(bars: &[Bar], period: usize) -> IndicatorSeries {
    let tr: Vec<Option<f64>> = true_range_values(bars).into_iter().map(Some).collect();
    IndicatorSeries::from_options(IndicatorType::Atr(period), bars, wilder(&tr, period))
}
