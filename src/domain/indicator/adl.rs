//! Accumulation/Distribution Line.
//!
//! MFM = ((C - L) - (H - C)) / (H - L), zero when H == L.
//! ADL[i] = ADL[i-1] + MFM * V. No warmup.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_adl(bars: &[Bar]) -> IndicatorSeries {
    let mut adl = 0.0;
    let values = bars
        .iter()
        .map(|bar| {
            let range = bar.high - bar.low;
            let multiplier = if range == 0.0 {
                0.0
            } else {
                ((bar.close - bar.low) - (bar.high - bar.close)) / range
            };
            adl += multiplier * bar.volume_or_zero();
            Some(adl)
        })
        .collect();

    IndicatorSeries::from_options(IndicatorType::Adl, bars, values)
}
