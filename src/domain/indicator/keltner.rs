//! Keltner Channels.
//!
//! Middle = EMA(typical price, period)
//! Upper  = Middle + multiplier × ATR(atr_period)
//! Lower  = Middle - multiplier × ATR(atr_period)
//!
//! Default parameters: period=20, atr period=10, multiplier=2.0

use crate::domain::indicator::{Band, Factor, IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::rolling_ema;
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_ATR_PERIOD: usize = 10;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

pub fn calculate_keltner_middle(bars: &[Bar], period: usize) -> IndicatorSeries {
    let typical: Vec<Option<f64>> = bars.iter().map(|b| Some(b.typical_price())).collect();
    IndicatorSeries::from_options(
        IndicatorType::KeltnerMiddle(period),
        bars,
        rolling_ema(&typical, period),
    )
}

pub fn calculate_keltner_band(
    bars: &[Bar],
    band: Band,
    (period, atr_period, multiplier): (usize, usize, Factor),
    middle: &IndicatorSeries,
    atr: &IndicatorSeries,
) -> IndicatorSeries {
    let width = |i: usize| Some(multiplier.get() * atr.value(i)?);
    let values = (0..bars.len())
        .map(|i| match band {
            Band::Upper => Some(middle.value(i)? + width(i)?),
            Band::Lower => Some(middle.value(i)? - width(i)?),
        })
        .collect();

    let indicator_type = match band {
        Band::Upper => IndicatorType::KeltnerUpper {
            period,
            atr_period,
            multiplier,
        },
        Band::Lower => IndicatorType::KeltnerLower {
            period,
            atr_period,
            multiplier,
        },
    };
    IndicatorSeries::from_options(indicator_type, bars, values)
}
