//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are invalid.
//!
//! Each band is its own series; both are built from the same cached SMA and
//! STDDEV series.

use crate::domain::indicator::{Band, Factor, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_K: f64 = 2.0;

pub fn calculate_bollinger_band(
    bars: &[Bar],
    band: Band,
    period: usize,
    k: Factor,
    middle: &IndicatorSeries,
    deviation: &IndicatorSeries,
) -> IndicatorSeries {
    let width = |i: usize| Some(k.get() * deviation.value(i)?);
    let values = (0..bars.len())
        .map(|i| match band {
            Band::Upper => Some(middle.value(i)? + width(i)?),
            Band::Lower => Some(middle.value(i)? - width(i)?),
        })
        .collect();

    let indicator_type = match band {
        Band::Upper => IndicatorType::BollingerUpper { period, k },
        Band::Lower => IndicatorType::BollingerLower { period, k },
    };
    IndicatorSeries::from_options(indicator_type, bars, values)
}
