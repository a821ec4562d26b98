#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use strategist::domain::error::StrategistError;
use strategist::domain::history_range::HistoryRange;
pub use strategist::domain::ohlcv::PriceRecord;
use strategist::domain::price_series::PriceSeries;
use strategist::domain::rule::{Comparison, IndicatorSpec};
use strategist::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceRecord>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_records(mut self, symbol: &str, records: Vec<PriceRecord>) -> Self {
        self.data.insert(symbol.to_string(), records);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_history(
        &self,
        symbol: &str,
        range: HistoryRange,
        _interval: &str,
    ) -> Result<Vec<PriceRecord>, StrategistError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StrategistError::Database {
                reason: reason.clone(),
            });
        }
        Ok(range.clip(self.data.get(symbol).cloned().unwrap_or_default()))
    }
}

pub fn day(n: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(n as i64)
}

/// Complete records from closes; high/low sit one point either side of close.
pub fn records_from_closes(closes: &[f64]) -> Vec<PriceRecord> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceRecord {
            timestamp: day(i),
            open: Some(c),
            high: Some(c + 1.0),
            low: Some(c - 1.0),
            close: Some(c),
            adj_close: Some(c),
            volume: Some(1_000.0 + i as f64),
        })
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_records("TEST", &records_from_closes(closes))
}

/// Strictly increasing closes: 100, 101, ...
pub fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

/// Deterministic wave with drift, enough to trigger crossings.
pub fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.45).sin() * 8.0 + i as f64 * 0.05)
        .collect()
}

pub fn close_vs(op: &str, value: &str) -> Comparison {
    Comparison::against_value(IndicatorSpec::new("CLOSE"), op, value)
}

pub fn sma(period: usize) -> IndicatorSpec {
    IndicatorSpec::new("SMA").with_param("period", period.to_string())
}
