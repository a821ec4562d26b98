//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars are invalid (need n price changes to compute initial average).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::wilder;
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    let change = |i: usize| (i > 0).then(|| bars[i].close - bars[i - 1].close);
    let gains: Vec<Option<f64>> = (0..bars.len())
        .map(|i| change(i).map(|c| c.max(0.0)))
        .collect();
    let losses: Vec<Option<f64>> = (0..bars.len())
        .map(|i| change(i).map(|c| (-c).max(0.0)))
        .collect();

    let avg_gain = wilder(&gains, period);
    let avg_loss = wilder(&losses, period);

    let values = avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| {
            let (g, l) = (g.as_ref()?, l.as_ref()?);
            Some(if *l == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + g / l)
            })
        })
        .collect();

    IndicatorSeries::from_options(IndicatorType::Rsi(period), bars, values)
}
