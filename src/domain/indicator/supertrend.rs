//! SuperTrend.
//!
//! basic upper/lower = (H + L) / 2 ± multiplier × ATR(period)
//!
//! The final upper band only ratchets down and the final lower band only
//! ratchets up while price stays inside them. The line sits on the lower
//! band in an uptrend and the upper band in a downtrend, flipping when the
//! close crosses the active band.

use crate::domain::indicator::{Factor, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 10;
pub const DEFAULT_MULTIPLIER: f64 = 3.0;

pub fn calculate_supertrend(
    bars: &[Bar],
    period: usize,
    multiplier: Factor,
    atr: &IndicatorSeries,
) -> IndicatorSeries {
    let m = multiplier.get();
    let mut values = Vec::with_capacity(bars.len());
    // (final upper, final lower, uptrend) carried from the previous bar
    let mut state: Option<(f64, f64, bool)> = None;

    for (i, bar) in bars.iter().enumerate() {
        let Some(atr) = atr.value(i) else {
            values.push(None);
            continue;
        };
        let mid = bar.median_price();
        let basic_upper = mid + m * atr;
        let basic_lower = mid - m * atr;

        let next = match state {
            None => (basic_upper, basic_lower, bar.close >= mid),
            Some((prev_upper, prev_lower, uptrend)) => {
                let prev_close = bars[i - 1].close;
                let upper = if basic_upper < prev_upper || prev_close > prev_upper {
                    basic_upper
                } else {
                    prev_upper
                };
                let lower = if basic_lower > prev_lower || prev_close < prev_lower {
                    basic_lower
                } else {
                    prev_lower
                };
                let uptrend = if uptrend {
                    bar.close >= lower
                } else {
                    bar.close > upper
                };
                (upper, lower, uptrend)
            }
        };

        let (upper, lower, uptrend) = next;
        values.push(Some(if uptrend { lower } else { upper }));
        state = Some(next);
    }

    IndicatorSeries::from_options(
        IndicatorType::SuperTrend {
            period,
            multiplier,
        },
        bars,
        values,
    )
}
