//! Rate of Change indicator.
//!
//! ROC(n)[i] = ((C[i] - C[i-n]) / C[i-n]) * 100
//! Warmup: first n bars are invalid.
//! A zero reference close leaves the point invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 12;
/// MOMENTUM is a rate of change with its own default lookback.
pub const DEFAULT_MOMENTUM_PERIOD: usize = 14;

pub fn calculate_roc(bars: &[Bar], period: usize) -> IndicatorSeries {
    let values = (0..bars.len())
        .map(|i| {
            if period == 0 || i < period {
                return None;
            }
            let prev = bars[i - period].close;
            (prev != 0.0).then(|| (bars[i].close - prev) / prev * 100.0)
        })
        .collect();

    IndicatorSeries::from_options(IndicatorType::Roc(period), bars, values)
}
