//! Weighted Moving Average indicator.
//!
//! WMA(n) = (n*C[i] + (n-1)*C[i-1] + ... + 1*C[i-n+1]) / (n*(n+1)/2)
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::rolling_wma;
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 20;

pub fn calculate_wma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close)).collect();
    IndicatorSeries::from_options(IndicatorType::Wma(period), bars, rolling_wma(&closes, period))
}
