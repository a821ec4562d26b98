//! Wilder's Parabolic SAR.
//!
//! The initial trend is taken from the first two closes. Each bar moves the
//! SAR toward the extreme point (EP) by the acceleration factor (AF), which
//! starts at 0.02, grows by 0.02 on every new extreme and is capped at 0.2.
//! The SAR may not pass the prior two lows (uptrend) or highs (downtrend);
//! price crossing it reverses the trend and resets the SAR to the old EP.
//!
//! Warmup: index 0 is invalid.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub const AF_STEP: f64 = 0.02;
pub const AF_MAX: f64 = 0.2;

pub fn calculate_parabolic_sar(bars: &[Bar]) -> IndicatorSeries {
    let mut values: Vec<Option<f64>> = Vec::with_capacity(bars.len());
    if bars.len() < 2 {
        values.resize(bars.len(), None);
        return IndicatorSeries::from_options(IndicatorType::ParabolicSar, bars, values);
    }

    let mut uptrend = bars[1].close >= bars[0].close;
    let mut sar = if uptrend { bars[0].low } else { bars[0].high };
    let mut ep = if uptrend { bars[1].high } else { bars[1].low };
    let mut af = AF_STEP;
    values.push(None);
    values.push(Some(sar));

    for i in 2..bars.len() {
        let bar = &bars[i];
        sar += af * (ep - sar);

        if uptrend {
            sar = sar.min(bars[i - 1].low).min(bars[i - 2].low);
            if bar.low < sar {
                uptrend = false;
                sar = ep;
                ep = bar.low;
                af = AF_STEP;
            } else if bar.high > ep {
                ep = bar.high;
                af = (af + AF_STEP).min(AF_MAX);
            }
        } else {
            sar = sar.max(bars[i - 1].high).max(bars[i - 2].high);
            if bar.high > sar {
                uptrend = true;
                sar = ep;
                ep = bar.high;
                af = AF_STEP;
            } else if bar.low < ep {
                ep = bar.low;
                af = (af + AF_STEP).min(AF_MAX);
            }
        }

        values.push(Some(sar));
    }

    IndicatorSeries::from_options(IndicatorType::ParabolicSar, bars, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::ohlc_bars;
    use approx::assert_relative_eq;

    fn rising(n: usize) -> Vec<(f64, f64, f64)> {
        (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                (c + 0.5, c - 0.5, c)
            })
            .collect()
    }

    #[test]
    fn sar_stays_below_price_in_uptrend() {
        let bars = ohlc_bars(&rising(20));
        let series = calculate_parabolic_sar(&bars);
        assert_eq!(series.value(0), None);
        for i in 1..20 {
            assert!(series.value(i).unwrap() < bars[i].low);
        }
    }

    #[test]
    fn sar_first_step() {
        let bars = ohlc_bars(&rising(3));
        let series = calculate_parabolic_sar(&bars);
        // seed SAR = low[0] = 99.5, EP = high[1] = 101.5
        assert_relative_eq!(series.value(1).unwrap(), 99.5);
        let expected = (99.5_f64 + 0.02 * (101.5 - 99.5)).min(99.5);
        assert_relative_eq!(series.value(2).unwrap(), expected);
    }

    #[test]
    fn sar_reverses_on_breakdown() {
        let mut hlc = rising(10);
        hlc.push((95.0, 80.0, 82.0));
        let bars = ohlc_bars(&hlc);
        let series = calculate_parabolic_sar(&bars);
        // reversal puts the SAR at the prior extreme, above the bar
        assert!(series.value(10).unwrap() > bars[10].high);
        assert_relative_eq!(series.value(10).unwrap(), 109.5);
    }

    #[test]
    fn sar_short_series() {
        let bars = ohlc_bars(&rising(1));
        assert_eq!(calculate_parabolic_sar(&bars).first_valid(), None);
    }
}
