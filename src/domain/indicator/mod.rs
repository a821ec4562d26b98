//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorType`: Indicator identity + resolved parameters (serves as cache key)
//! - `IndicatorSeries`: A time series of indicator values aligned to a price series
//!
//! Every calculation is a single forward sweep over the bars that carries its
//! state from one index to the next. Composite indicators receive their
//! component series from the [`engine::IndicatorEngine`] cache instead of
//! recomputing them.

pub mod adl;
pub mod adx;
pub mod atr;
pub mod awesome;
pub mod bollinger;
pub mod cci;
pub mod donchian;
pub mod ema;
pub mod engine;
pub mod fisher;
pub mod hma;
pub mod ichimoku;
pub mod keltner;
pub mod macd;
pub mod obv;
pub mod parabolic_sar;
pub mod price;
pub mod registry;
pub mod roc;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod supertrend;
pub mod vwap;
pub mod williams_r;
pub mod wma;

use crate::domain::ohlcv::Bar;
use chrono::NaiveDateTime;
use std::fmt;
use std::hash::{Hash, Hasher};

pub use price::PriceField;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Price(PriceField),
    TrueRange,
    Sma(usize),
    Ema(usize),
    Wma(usize),
    Hma(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
    },
    StochasticK(usize),
    Roc(usize),
    Cci(usize),
    WilliamsR(usize),
    AwesomeOscillator,
    Adx(usize),
    PlusDi(usize),
    MinusDi(usize),
    Atr(usize),
    Stddev(usize),
    Obv,
    Vwap(usize),
    Adl,
    BollingerUpper {
        period: usize,
        k: Factor,
    },
    BollingerLower {
        period: usize,
        k: Factor,
    },
    KeltnerMiddle(usize),
    KeltnerUpper {
        period: usize,
        atr_period: usize,
        multiplier: Factor,
    },
    KeltnerLower {
        period: usize,
        atr_period: usize,
        multiplier: Factor,
    },
    DonchianUpper(usize),
    DonchianLower(usize),
    ParabolicSar,
    Fisher(usize),
    IchimokuTenkan(usize),
    IchimokuKijun(usize),
    SuperTrend {
        period: usize,
        multiplier: Factor,
    },
}

/// Side of a band or channel indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Upper,
    Lower,
}

/// A resolved floating-point parameter, compared and hashed by its bits so
/// it can sit in the cache key without rounding.
#[derive(Debug, Clone, Copy)]
pub struct Factor(f64);

impl Factor {
    pub fn new(value: f64) -> Self {
        // fold -0.0 into 0.0 so equal values share one key
        Factor(if value == 0.0 { 0.0 } else { value })
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for Factor {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Factor {}

impl Hash for Factor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Pairs a sweep result with the bar timestamps; `None` marks warmup.
    pub fn from_options(
        indicator_type: IndicatorType,
        bars: &[Bar],
        values: Vec<Option<f64>>,
    ) -> Self {
        debug_assert_eq!(bars.len(), values.len());
        let values = bars
            .iter()
            .zip(values)
            .map(|(bar, v)| IndicatorPoint {
                timestamp: bar.timestamp,
                valid: v.is_some(),
                value: v.unwrap_or(0.0),
            })
            .collect();
        Self {
            indicator_type,
            values,
        }
    }

    /// Value at `index`, or `None` while warming up or out of range.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    /// All values as options, for composing one series from others.
    pub fn options(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|p| if p.valid { Some(p.value) } else { None })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the first valid value.
    pub fn first_valid(&self) -> Option<usize> {
        self.values.iter().position(|p| p.valid)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Price(field) => write!(f, "{}", field),
            IndicatorType::TrueRange => write!(f, "TR"),
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Wma(period) => write!(f, "WMA({})", period),
            IndicatorType::Hma(period) => write!(f, "HMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow } => write!(f, "MACD({},{})", fast, slow),
            IndicatorType::StochasticK(period) => write!(f, "STOCHASTIC({})", period),
            IndicatorType::Roc(period) => write!(f, "ROC({})", period),
            IndicatorType::Cci(period) => write!(f, "CCI({})", period),
            IndicatorType::WilliamsR(period) => write!(f, "WILLIAMSR({})", period),
            IndicatorType::AwesomeOscillator => write!(f, "AWESOMEOSCILLATOR"),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::PlusDi(period) => write!(f, "PLUSDI({})", period),
            IndicatorType::MinusDi(period) => write!(f, "MINUSDI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Obv => write!(f, "OBV"),
            IndicatorType::Vwap(period) => write!(f, "VWAP({})", period),
            IndicatorType::Adl => write!(f, "ADL"),
            IndicatorType::BollingerUpper { period, k } => {
                write!(f, "BOLLINGERUPPER({},{})", period, k)
            }
            IndicatorType::BollingerLower { period, k } => {
                write!(f, "BOLLINGERLOWER({},{})", period, k)
            }
            IndicatorType::KeltnerMiddle(period) => write!(f, "KELTNERMIDDLE({})", period),
            IndicatorType::KeltnerUpper {
                period,
                atr_period,
                multiplier,
            } => write!(
                f,
                "KELTNERUPPER({},{},{})",
                period,
                atr_period,
                multiplier
            ),
            IndicatorType::KeltnerLower {
                period,
                atr_period,
                multiplier,
            } => write!(
                f,
                "KELTNERLOWER({},{},{})",
                period,
                atr_period,
                multiplier
            ),
            IndicatorType::DonchianUpper(period) => write!(f, "DONCHIANUPPER({})", period),
            IndicatorType::DonchianLower(period) => write!(f, "DONCHIANLOWER({})", period),
            IndicatorType::ParabolicSar => write!(f, "PARABOLICSAR"),
            IndicatorType::Fisher(period) => write!(f, "FISHER({})", period),
            IndicatorType::IchimokuTenkan(period) => write!(f, "ICHIMOKUTENKAN({})", period),
            IndicatorType::IchimokuKijun(period) => write!(f, "ICHIMOKUKIJUN({})", period),
            IndicatorType::SuperTrend {
                period,
                multiplier,
            } => write!(f, "SUPERTREND({},{})", period, multiplier),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::ohlcv::Bar;
    use chrono::{Duration, NaiveDate};

    /// Bars whose open/high/low all equal the close.
    pub fn flat_bars(prices: &[f64]) -> Vec<Bar> {
        ohlc_bars(
            &prices
                .iter()
                .map(|&c| (c, c, c))
                .collect::<Vec<(f64, f64, f64)>>(),
        )
    }

    /// Bars from (high, low, close) triples, open = close, volume 1000.
    pub fn ohlc_bars(hlc: &[(f64, f64, f64)]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        hlc.iter()
            .enumerate()
            .map(|(i, &(high, low, close))| Bar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high,
                low,
                close,
                volume: Some(1000.0),
            })
            .collect()
    }
}
