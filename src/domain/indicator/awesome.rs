//! Awesome Oscillator: SMA(median price, 5) - SMA(median price, 34).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::rolling_mean;
use crate::domain::ohlcv::Bar;

pub const FAST_PERIOD: usize = 5;
pub const SLOW_PERIOD: usize = 34;

pub fn calculate_awesome_oscillator(bars: &[Bar]) -> IndicatorSeries {
    let median: Vec<Option<f64>> = bars.iter().map(|b| Some(b.median_price())).collect();
    let fast = rolling_mean(&median, FAST_PERIOD);
    let slow = rolling_mean(&median, SLOW_PERIOD);

    let values = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    IndicatorSeries::from_options(IndicatorType::AwesomeOscillator, bars, values)
}
