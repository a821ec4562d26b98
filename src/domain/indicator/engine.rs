//! Per-series indicator cache.
//!
//! One engine serves one price series for one compilation pass. Each
//! `IndicatorType` is computed at most once; composite indicators pull
//! their components through the same cache, so a component referenced on
//! its own elsewhere in the rule tree is shared rather than recomputed.
//! The returned series are immutable and may be read from other threads.

use crate::domain::error::StrategistError;
use crate::domain::indicator::adx::{calculate_adx, calculate_di, Direction};
use crate::domain::indicator::bollinger::calculate_bollinger_band;
use crate::domain::indicator::donchian::calculate_donchian;
use crate::domain::indicator::hma::{calculate_hma, half_period};
use crate::domain::indicator::ichimoku::calculate_midpoint;
use crate::domain::indicator::keltner::{calculate_keltner_band, calculate_keltner_middle};
use crate::domain::indicator::macd::calculate_macd;
use crate::domain::indicator::price::{calculate_price, calculate_true_range};
use crate::domain::indicator::{
    adl, atr, awesome, cci, ema, fisher, obv, parabolic_sar, registry, roc, rsi, sma, stddev,
    stochastic, supertrend, vwap, williams_r, wma, Band, Factor, IndicatorSeries, IndicatorType,
};
use crate::domain::price_series::PriceSeries;
use crate::domain::rule::IndicatorSpec;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub struct IndicatorEngine<'a> {
    series: &'a PriceSeries,
    cache: HashMap<IndicatorType, Arc<IndicatorSeries>>,
}

impl<'a> IndicatorEngine<'a> {
    pub fn new(series: &'a PriceSeries) -> Self {
        Self {
            series,
            cache: HashMap::new(),
        }
    }

    pub fn series(&self) -> &'a PriceSeries {
        self.series
    }

    /// Looks up the indicator name in the registry and returns its (cached) series.
    pub fn resolve(&mut self, spec: &IndicatorSpec) -> Result<Arc<IndicatorSeries>, StrategistError> {
        let indicator_type = registry::resolve_type(spec)?;
        Ok(self.get(indicator_type))
    }

    pub fn get(&mut self, indicator_type: IndicatorType) -> Arc<IndicatorSeries> {
        if let Some(series) = self.cache.get(&indicator_type) {
            debug!(indicator = %indicator_type, "indicator cache hit");
            return Arc::clone(series);
        }
        let series = Arc::new(self.compute(indicator_type));
        self.cache.insert(indicator_type, Arc::clone(&series));
        series
    }

    /// Number of distinct series computed so far.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    fn compute(&mut self, indicator_type: IndicatorType) -> IndicatorSeries {
        let series = self.series;
        let bars = series.bars();
        match indicator_type {
            IndicatorType::Price(field) => calculate_price(bars, field),
            IndicatorType::TrueRange => calculate_true_range(bars),
            IndicatorType::Sma(period) => sma::calculate_sma(bars, period),
            IndicatorType::Ema(period) => ema::calculate_ema(bars, period),
            IndicatorType::Wma(period) => wma::calculate_wma(bars, period),
            IndicatorType::Hma(period) => {
                let half = self.get(IndicatorType::Wma(half_period(period)));
                let full = self.get(IndicatorType::Wma(period));
                calculate_hma(bars, period, &half, &full)
            }
            IndicatorType::Rsi(period) => rsi::calculate_rsi(bars, period),
            IndicatorType::Macd { fast, slow } => {
                let ema_fast = self.get(IndicatorType::Ema(fast));
                let ema_slow = self.get(IndicatorType::Ema(slow));
                calculate_macd(bars, fast, slow, &ema_fast, &ema_slow)
            }
            IndicatorType::StochasticK(period) => {
                stochastic::calculate_stochastic_k(bars, period)
            }
            IndicatorType::Roc(period) => roc::calculate_roc(bars, period),
            IndicatorType::Cci(period) => cci::calculate_cci(bars, period),
            IndicatorType::WilliamsR(period) => williams_r::calculate_williams_r(bars, period),
            IndicatorType::AwesomeOscillator => awesome::calculate_awesome_oscillator(bars),
            IndicatorType::Adx(period) => {
                let plus = self.get(IndicatorType::PlusDi(period));
                let minus = self.get(IndicatorType::MinusDi(period));
                calculate_adx(bars, period, &plus, &minus)
            }
            IndicatorType::PlusDi(period) => {
                let atr = self.get(IndicatorType::Atr(period));
                calculate_di(bars, period, Direction::Plus, &atr)
            }
            IndicatorType::MinusDi(period) => {
                let atr = self.get(IndicatorType::Atr(period));
                calculate_di(bars, period, Direction::Minus, &atr)
            }
            IndicatorType::Atr(period) => atr::calculate_atr(bars, period),
            IndicatorType::Stddev(period) => stddev::calculate_stddev(bars, period),
            IndicatorType::Obv => obv::calculate_obv(bars),
            IndicatorType::Vwap(period) => vwap::calculate_vwap(bars, period),
            IndicatorType::Adl => adl::calculate_adl(bars),
            IndicatorType::BollingerUpper { period, k } => self.bollinger(Band::Upper, period, k),
            IndicatorType::BollingerLower { period, k } => self.bollinger(Band::Lower, period, k),
            IndicatorType::KeltnerMiddle(period) => calculate_keltner_middle(bars, period),
            IndicatorType::KeltnerUpper {
                period,
                atr_period,
                multiplier,
            } => self.keltner(Band::Upper, (period, atr_period, multiplier)),
            IndicatorType::KeltnerLower {
                period,
                atr_period,
                multiplier,
            } => self.keltner(Band::Lower, (period, atr_period, multiplier)),
            IndicatorType::DonchianUpper(period) => calculate_donchian(bars, Band::Upper, period),
            IndicatorType::DonchianLower(period) => calculate_donchian(bars, Band::Lower, period),
            IndicatorType::ParabolicSar => parabolic_sar::calculate_parabolic_sar(bars),
            IndicatorType::Fisher(period) => fisher::calculate_fisher(bars, period),
            IndicatorType::IchimokuTenkan(period) | IndicatorType::IchimokuKijun(period) => {
                let highest = self.get(IndicatorType::DonchianUpper(period));
                let lowest = self.get(IndicatorType::DonchianLower(period));
                calculate_midpoint(bars, indicator_type, &highest, &lowest)
            }
            IndicatorType::SuperTrend {
                period,
                multiplier,
            } => {
                let atr = self.get(IndicatorType::Atr(period));
                supertrend::calculate_supertrend(bars, period, multiplier, &atr)
            }
        }
    }

    fn bollinger(&mut self, band: Band, period: usize, k: Factor) -> IndicatorSeries {
        let middle = self.get(IndicatorType::Sma(period));
        let deviation = self.get(IndicatorType::Stddev(period));
        let bars = self.series.bars();
        calculate_bollinger_band(bars, band, period, k, &middle, &deviation)
    }

    fn keltner(&mut self, band: Band, params: (usize, usize, Factor)) -> IndicatorSeries {
        let (period, atr_period, _) = params;
        let middle = self.get(IndicatorType::KeltnerMiddle(period));
        let atr = self.get(IndicatorType::Atr(atr_period));
        calculate_keltner_band(self.series.bars(), band, params, &middle, &atr)
    }
}
