//! Name → indicator family table.
//!
//! Names are normalized (whitespace removed, upper-cased) before lookup.
//! Aliases are plain extra rows pointing at the same family. Parameters are
//! read from the `IndicatorSpec` case-insensitively; a missing, unparsable or zero
//! value falls back to the family default.

use crate::domain::error::StrategistError;
use crate::domain::indicator::{
    adx, atr, bollinger, cci, donchian, ema, fisher, hma, ichimoku, keltner, macd, roc, rsi, sma,
    stddev, stochastic, supertrend, vwap, williams_r, wma, Factor, IndicatorType, PriceField,
};
use crate::domain::rule::IndicatorSpec;
use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorKind {
    Price(PriceField),
    TrueRange,
    Sma,
    Ema,
    Wma,
    Hma,
    Rsi,
    Macd,
    Stochastic,
    Roc,
    Momentum,
    Cci,
    WilliamsR,
    AwesomeOscillator,
    Adx,
    PlusDi,
    MinusDi,
    Atr,
    StandardDeviation,
    Obv,
    Vwap,
    Adl,
    BollingerUpper,
    BollingerLower,
    KeltnerUpper,
    KeltnerLower,
    DonchianUpper,
    DonchianLower,
    ParabolicSar,
    Fisher,
    IchimokuTenkan,
    IchimokuKijun,
    SuperTrend,
}

const ENTRIES: &[(&str, IndicatorKind)] = &[
    // price
    ("CLOSE", IndicatorKind::Price(PriceField::Close)),
    ("PRICE", IndicatorKind::Price(PriceField::Close)),
    ("OPEN", IndicatorKind::Price(PriceField::Open)),
    ("HIGH", IndicatorKind::Price(PriceField::High)),
    ("LOW", IndicatorKind::Price(PriceField::Low)),
    ("VOLUME", IndicatorKind::Price(PriceField::Volume)),
    ("TR", IndicatorKind::TrueRange),
    // moving averages
    ("SMA", IndicatorKind::Sma),
    ("SMA50", IndicatorKind::Sma),
    ("EMA", IndicatorKind::Ema),
    ("EMA20", IndicatorKind::Ema),
    ("WMA", IndicatorKind::Wma),
    ("HMA", IndicatorKind::Hma),
    // momentum
    ("RSI", IndicatorKind::Rsi),
    ("MACD", IndicatorKind::Macd),
    ("STOCHASTIC", IndicatorKind::Stochastic),
    ("STOCHASTICOSCILLATOR", IndicatorKind::Stochastic),
    ("ROC", IndicatorKind::Roc),
    ("MOMENTUM", IndicatorKind::Momentum),
    ("CCI", IndicatorKind::Cci),
    ("WILLIAMSR", IndicatorKind::WilliamsR),
    ("AWESOMEOSCILLATOR", IndicatorKind::AwesomeOscillator),
    // trend strength
    ("ADX", IndicatorKind::Adx),
    ("PLUSDI", IndicatorKind::PlusDi),
    ("MINUSDI", IndicatorKind::MinusDi),
    // volatility
    ("ATR", IndicatorKind::Atr),
    ("AVERAGETRUERANGE", IndicatorKind::Atr),
    ("STANDARDDEVIATION", IndicatorKind::StandardDeviation),
    // volume
    ("OBV", IndicatorKind::Obv),
    ("VWAP", IndicatorKind::Vwap),
    ("ADL", IndicatorKind::Adl),
    // bands and channels
    ("BOLLINGER", IndicatorKind::BollingerUpper),
    ("BOLLINGERBANDS", IndicatorKind::BollingerUpper),
    ("BOLLINGERUPPER", IndicatorKind::BollingerUpper),
    ("BOLLINGERBANDSUPPER", IndicatorKind::BollingerUpper),
    ("BOLLINGERLOWER", IndicatorKind::BollingerLower),
    ("BOLLINGERBANDSLOWER", IndicatorKind::BollingerLower),
    ("KELTNER", IndicatorKind::KeltnerUpper),
    ("KELTNERCHANNELS", IndicatorKind::KeltnerUpper),
    ("KELTNERUPPER", IndicatorKind::KeltnerUpper),
    ("KELTNERCHANNELUPPER", IndicatorKind::KeltnerUpper),
    ("KELTNERLOWER", IndicatorKind::KeltnerLower),
    ("KELTNERCHANNELLOWER", IndicatorKind::KeltnerLower),
    ("DONCHIAN", IndicatorKind::DonchianUpper),
    ("DONCHIANCHANNELS", IndicatorKind::DonchianUpper),
    ("DONCHIANUPPER", IndicatorKind::DonchianUpper),
    ("DONCHIANCHANNELUPPER", IndicatorKind::DonchianUpper),
    ("HIGHESTHIGH", IndicatorKind::DonchianUpper),
    ("DONCHIANLOWER", IndicatorKind::DonchianLower),
    ("DONCHIANCHANNELLOWER", IndicatorKind::DonchianLower),
    ("LOWESTLOW", IndicatorKind::DonchianLower),
    // reversal
    ("PARABOLICSAR", IndicatorKind::ParabolicSar),
    ("FISHER", IndicatorKind::Fisher),
    // ichimoku
    ("ICHIMOKU", IndicatorKind::IchimokuTenkan),
    ("ICHIMOKUCLOUD", IndicatorKind::IchimokuTenkan),
    ("ICHIMOKUTENKAN", IndicatorKind::IchimokuTenkan),
    ("ICHIMOKUTENKANSEN", IndicatorKind::IchimokuTenkan),
    ("ICHIMOKUKIJUN", IndicatorKind::IchimokuKijun),
    ("ICHIMOKUKIJUNSEN", IndicatorKind::IchimokuKijun),
    ("SUPERTREND", IndicatorKind::SuperTrend),
];

static REGISTRY: LazyLock<HashMap<&'static str, IndicatorKind>> =
    LazyLock::new(|| ENTRIES.iter().copied().collect());

/// Every registered key, in table order.
pub fn registered_names() -> impl Iterator<Item = &'static str> {
    ENTRIES.iter().map(|(name, _)| *name)
}

pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

pub fn lookup(name: &str) -> Result<IndicatorKind, StrategistError> {
    REGISTRY
        .get(normalize(name).as_str())
        .copied()
        .ok_or_else(|| StrategistError::UnknownIndicator {
            name: name.to_string(),
        })
}

/// Resolves a spec to the cache key of the series it denotes.
pub fn resolve_type(spec: &IndicatorSpec) -> Result<IndicatorType, StrategistError> {
    Ok(lookup(&spec.name)?.configure(spec))
}

fn int_param(spec: &IndicatorSpec, name: &str, default: usize) -> usize {
    spec.param(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default)
}

fn factor_param(spec: &IndicatorSpec, name: &str, default: f64) -> Factor {
    let value = spec
        .param(name)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(default);
    Factor::new(value)
}

impl IndicatorKind {
    pub fn configure(self, spec: &IndicatorSpec) -> IndicatorType {
        let period = |default| int_param(spec, "period", default);
        match self {
            IndicatorKind::Price(field) => IndicatorType::Price(field),
            IndicatorKind::TrueRange => IndicatorType::TrueRange,
            IndicatorKind::Sma => IndicatorType::Sma(period(sma::DEFAULT_PERIOD)),
            IndicatorKind::Ema => IndicatorType::Ema(period(ema::DEFAULT_PERIOD)),
            IndicatorKind::Wma => IndicatorType::Wma(period(wma::DEFAULT_PERIOD)),
            IndicatorKind::Hma => IndicatorType::Hma(period(hma::DEFAULT_PERIOD)),
            IndicatorKind::Rsi => IndicatorType::Rsi(period(rsi::DEFAULT_PERIOD)),
            IndicatorKind::Macd => IndicatorType::Macd {
                fast: int_param(spec, "fast", macd::DEFAULT_FAST),
                slow: int_param(spec, "slow", macd::DEFAULT_SLOW),
            },
            IndicatorKind::Stochastic => IndicatorType::StochasticK(int_param(
                spec,
                "kPeriod",
                stochastic::DEFAULT_PERIOD,
            )),
            IndicatorKind::Roc => IndicatorType::Roc(period(roc::DEFAULT_PERIOD)),
            IndicatorKind::Momentum => IndicatorType::Roc(period(roc::DEFAULT_MOMENTUM_PERIOD)),
            IndicatorKind::Cci => IndicatorType::Cci(period(cci::DEFAULT_PERIOD)),
            IndicatorKind::WilliamsR => IndicatorType::WilliamsR(period(williams_r::DEFAULT_PERIOD)),
            IndicatorKind::AwesomeOscillator => IndicatorType::AwesomeOscillator,
            IndicatorKind::Adx => IndicatorType::Adx(period(adx::DEFAULT_PERIOD)),
            IndicatorKind::PlusDi => IndicatorType::PlusDi(period(adx::DEFAULT_PERIOD)),
            IndicatorKind::MinusDi => IndicatorType::MinusDi(period(adx::DEFAULT_PERIOD)),
            IndicatorKind::Atr => IndicatorType::Atr(period(atr::DEFAULT_PERIOD)),
            IndicatorKind::StandardDeviation => {
                IndicatorType::Stddev(period(stddev::DEFAULT_PERIOD))
            }
            IndicatorKind::Obv => IndicatorType::Obv,
            IndicatorKind::Vwap => IndicatorType::Vwap(period(vwap::DEFAULT_PERIOD)),
            IndicatorKind::Adl => IndicatorType::Adl,
            IndicatorKind::BollingerUpper => IndicatorType::BollingerUpper {
                period: period(bollinger::DEFAULT_PERIOD),
                k: factor_param(spec, "stdDev", bollinger::DEFAULT_K),
            },
            IndicatorKind::BollingerLower => IndicatorType::BollingerLower {
                period: period(bollinger::DEFAULT_PERIOD),
                k: factor_param(spec, "stdDev", bollinger::DEFAULT_K),
            },
            IndicatorKind::KeltnerUpper => IndicatorType::KeltnerUpper {
                period: period(keltner::DEFAULT_PERIOD),
                atr_period: int_param(spec, "atr", keltner::DEFAULT_ATR_PERIOD),
                multiplier: factor_param(spec, "multiplier", keltner::DEFAULT_MULTIPLIER),
            },
            IndicatorKind::KeltnerLower => IndicatorType::KeltnerLower {
                period: period(keltner::DEFAULT_PERIOD),
                atr_period: int_param(spec, "atr", keltner::DEFAULT_ATR_PERIOD),
                multiplier: factor_param(spec, "multiplier", keltner::DEFAULT_MULTIPLIER),
            },
            IndicatorKind::DonchianUpper => {
                IndicatorType::DonchianUpper(period(donchian::DEFAULT_PERIOD))
            }
            IndicatorKind::DonchianLower => {
                IndicatorType::DonchianLower(period(donchian::DEFAULT_PERIOD))
            }
            IndicatorKind::ParabolicSar => IndicatorType::ParabolicSar,
            IndicatorKind::Fisher => IndicatorType::Fisher(period(fisher::DEFAULT_PERIOD)),
            IndicatorKind::IchimokuTenkan => IndicatorType::IchimokuTenkan(int_param(
                spec,
                "tenkan",
                ichimoku::DEFAULT_TENKAN,
            )),
            IndicatorKind::IchimokuKijun => IndicatorType::IchimokuKijun(int_param(
                spec,
                "kijun",
                ichimoku::DEFAULT_KIJUN,
            )),
            IndicatorKind::SuperTrend => IndicatorType::SuperTrend {
                period: period(supertrend::DEFAULT_PERIOD),
                multiplier: factor_param(spec, "multiplier", supertrend::DEFAULT_MULTIPLIER),
            },
        }
    }
}
