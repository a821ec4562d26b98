//! Commodity Channel Index.
//!
//! CCI = (TP - SMA(TP, n)) / (0.015 * mean deviation of TP over n)
//!
//! The mean deviation needs every value in the window against the current
//! mean, so each point walks its window. A zero deviation yields 0.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::rolling_mean;
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 20;
const CONSTANT: f64 = 0.015;

pub fn calculate_cci(bars: &[Bar], period: usize) -> IndicatorSeries {
    let typical: Vec<f64> = bars.iter().map(Bar::typical_price).collect();
    let means = rolling_mean(
        &typical.iter().copied().map(Some).collect::<Vec<_>>(),
        period,
    );

    let values = means
        .iter()
        .enumerate()
        .map(|(i, mean)| {
            let mean = (*mean)?;
            let window = &typical[i + 1 - period..=i];
            let deviation =
                window.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period as f64;
            Some(if deviation == 0.0 {
                0.0
            } else {
                (typical[i] - mean) / (CONSTANT * deviation)
            })
        })
        .collect();

    IndicatorSeries::from_options(IndicatorType::Cci(period), bars, values)
}
