//! Donchian channel: highest high and lowest low over n bars.
//!
//! HIGHESTHIGH and LOWESTLOW resolve to the same series.

use crate::domain::indicator::{Band, IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::{rolling_max, rolling_min};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 20;

pub fn calculate_donchian(bars: &[Bar], band: Band, period: usize) -> IndicatorSeries {
    let (values, indicator_type) = match band {
        Band::Upper => {
            let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
            (rolling_max(&highs, period), IndicatorType::DonchianUpper(period))
        }
        Band::Lower => {
            let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
            (rolling_min(&lows, period), IndicatorType::DonchianLower(period))
        }
    };
    IndicatorSeries::from_options(indicator_type, bars, values)
}
