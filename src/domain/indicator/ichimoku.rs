//! Ichimoku conversion (tenkan-sen) and base (kijun-sen) lines.
//!
//! Both are the midpoint of the Donchian channel over their period, so they
//! read the cached channel series.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_TENKAN: usize = 9;
pub const DEFAULT_KIJUN: usize = 26;

pub fn calculate_midpoint(
    bars: &[Bar],
    indicator_type: IndicatorType,
    highest: &IndicatorSeries,
    lowest: &IndicatorSeries,
) -> IndicatorSeries {
    let values = (0..bars.len())
        .map(|i| Some((highest.value(i)? + lowest.value(i)?) / 2.0))
        .collect();
    IndicatorSeries::from_options(indicator_type, bars, values)
}
