//! Rolling volume-weighted average price.
//!
//! VWAP(n) = sum(TP * V) / sum(V) over the last n bars, TP the typical price.
//! A window with no volume is left invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_vwap(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut weighted = 0.0;
    let mut volume = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let v = bar.volume_or_zero();
        weighted += bar.typical_price() * v;
        volume += v;
        if period > 0 && i >= period {
            let old = &bars[i - period];
            weighted -= old.typical_price() * old.volume_or_zero();
            volume -= old.volume_or_zero();
        }

        let ready = period > 0 && i + 1 >= period;
        values.push((ready && volume > 0.0).then(|| weighted / volume));
    }

    IndicatorSeries::from_options(IndicatorType::Vwap(period), bars, values)
}
