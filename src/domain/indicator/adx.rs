//! Directional movement: +DI, -DI and ADX.
//!
//! +DM = H[i] - H[i-1] when that exceeds L[i-1] - L[i] and is positive, else 0.
//! -DM is the mirror image. Both are Wilder-smoothed and divided by ATR(n):
//! DI = 100 * smoothed DM / ATR. DX = 100 * |+DI - -DI| / (+DI + -DI), and
//! ADX is DX Wilder-smoothed over n.
//!
//! Warmup: the DI lines are valid from n, ADX from 2n - 1.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::wilder;
use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Plus,
    Minus,
}

fn directional_movement(bars: &[Bar], direction: Direction) -> Vec<Option<f64>> {
    (0..bars.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            let up = bars[i].high - bars[i - 1].high;
            let down = bars[i - 1].low - bars[i].low;
            let (own, other) = match direction {
                Direction::Plus => (up, down),
                Direction::Minus => (down, up),
            };
            Some(if own > other && own > 0.0 { own } else { 0.0 })
        })
        .collect()
}

/// One DI line, reusing the cached ATR of the same period.
pub fn calculate_di(
    bars: &[Bar],
    period: usize,
    direction: Direction,
    atr: &IndicatorSeries,
) -> IndicatorSeries {
    let smoothed = wilder(&directional_movement(bars, direction), period);
    let values = smoothed
        .iter()
        .enumerate()
        .map(|(i, dm)| {
            let (dm, atr) = ((*dm)?, atr.value(i)?);
            Some(if atr == 0.0 { 0.0 } else { 100.0 * dm / atr })
        })
        .collect();

    let indicator_type = match direction {
        Direction::Plus => IndicatorType::PlusDi(period),
        Direction::Minus => IndicatorType::MinusDi(period),
    };
    IndicatorSeries::from_options(indicator_type, bars, values)
}

pub fn calculate_adx(
    bars: &[Bar],
    period: usize,
    plus_di: &IndicatorSeries,
    minus_di: &IndicatorSeries,
) -> IndicatorSeries {
    let dx: Vec<Option<f64>> = (0..bars.len())
        .map(|i| {
            let (p, m) = (plus_di.value(i)?, minus_di.value(i)?);
            let sum = p + m;
            Some(if sum == 0.0 {
                0.0
            } else {
                100.0 * (p - m).abs() / sum
            })
        })
        .collect();

    IndicatorSeries::from_options(IndicatorType::Adx(period), bars, wilder(&dx, period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::atr::calculate_atr;
    use crate::domain::indicator::test_support::ohlc_bars;
    use approx::assert_relative_eq;

    fn trending_up(n: usize) -> Vec<Bar> {
        let hlc: Vec<(f64, f64, f64)> = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64;
                (base + 1.0, base - 1.0, base)
            })
            .collect();
        ohlc_bars(&hlc)
    }

    #[test]
    fn dm_rules() {
        let bars = ohlc_bars(&[(10.0, 8.0, 9.0), (12.0, 7.0, 10.0), (11.0, 5.0, 6.0)]);
        let plus = directional_movement(&bars, Direction::Plus);
        let minus = directional_movement(&bars, Direction::Minus);
        assert_eq!(plus[0], None);
        // up 2, down 1
        assert_eq!(plus[1], Some(2.0));
        assert_eq!(minus[1], Some(0.0));
        // up -1, down 2
        assert_eq!(plus[2], Some(0.0));
        assert_eq!(minus[2], Some(2.0));
    }

    #[test]
    fn uptrend_has_positive_plus_di_and_zero_minus_di() {
        let bars = trending_up(40);
        let atr = calculate_atr(&bars, 5);
        let plus = calculate_di(&bars, 5, Direction::Plus, &atr);
        let minus = calculate_di(&bars, 5, Direction::Minus, &atr);

        assert_eq!(plus.first_valid(), Some(5));
        assert!(plus.value(30).unwrap() > 0.0);
        assert_relative_eq!(minus.value(30).unwrap(), 0.0);
    }

    #[test]
    fn adx_warmup_and_strong_trend() {
        let bars = trending_up(40);
        let atr = calculate_atr(&bars, 5);
        let plus = calculate_di(&bars, 5, Direction::Plus, &atr);
        let minus = calculate_di(&bars, 5, Direction::Minus, &atr);
        let adx = calculate_adx(&bars, 5, &plus, &minus);

        assert_eq!(adx.first_valid(), Some(9));
        // -DI is zero throughout, so every DX is 100
        assert_relative_eq!(adx.value(39).unwrap(), 100.0, epsilon = 1e-9);
    }
}
