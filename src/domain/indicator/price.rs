//! Raw bar fields exposed as indicators, plus true range.
//!
//! These are valid from index 0. True range at index 0 has no previous close
//! and falls back to high - low.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    pub fn read(self, bar: &Bar) -> f64 {
        match self {
            PriceField::Open => bar.open,
            PriceField::High => bar.high,
            PriceField::Low => bar.low,
            PriceField::Close => bar.close,
            PriceField::Volume => bar.volume_or_zero(),
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriceField::Open => "OPEN",
            PriceField::High => "HIGH",
            PriceField::Low => "LOW",
            PriceField::Close => "CLOSE",
            PriceField::Volume => "VOLUME",
        };
        f.write_str(name)
    }
}

pub fn calculate_price(bars: &[Bar], field: PriceField) -> IndicatorSeries {
    let values = bars.iter().map(|b| Some(field.read(b))).collect();
    IndicatorSeries::from_options(IndicatorType::Price(field), bars, values)
}

pub fn true_range_values(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| match i {
            0 => bar.high - bar.low,
            _ => bar.true_range(bars[i - 1].close),
        })
        .collect()
}

pub fn calculate_true_range(bars: &[Bar]) -> IndicatorSeries {
    let values = true_range_values(bars).into_iter().map(Some).collect();
    IndicatorSeries::from_options(IndicatorType::TrueRange, bars, values)
}
