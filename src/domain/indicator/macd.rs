//! MACD (Moving Average Convergence Divergence) line.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//!
//! Default parameters: fast=12, slow=26
//! Warmup: max(fast, slow) - 1 bars. Both EMAs come from the engine cache.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;

pub fn calculate_macd(
    bars: &[Bar],
    fast: usize,
    slow: usize,
    ema_fast: &IndicatorSeries,
    ema_slow: &IndicatorSeries,
) -> IndicatorSeries {
    let values = (0..bars.len())
        .map(|i| Some(ema_fast.value(i)? - ema_slow.value(i)?))
        .collect();
    IndicatorSeries::from_options(IndicatorType::Macd { fast, slow }, bars, values)
}
