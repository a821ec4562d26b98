//! Ordered bar container that every indicator and backtest runs over.

use crate::domain::ohlcv::{Bar, PriceRecord};
use tracing::{debug, warn};

/// Bars with strictly increasing timestamps, indexed `0..len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Admits provider rows in order. Rows missing any of open/high/low/close
    /// and rows that do not advance the timestamp are dropped.
    pub fn from_records(symbol: &str, records: &[PriceRecord]) -> Self {
        let mut bars: Vec<Bar> = Vec::with_capacity(records.len());
        let mut incomplete = 0usize;
        let mut out_of_order = 0usize;

        for record in records {
            let Some(bar) = Bar::from_record(record) else {
                incomplete += 1;
                continue;
            };
            if let Some(last) = bars.last() {
                if bar.timestamp <= last.timestamp {
                    out_of_order += 1;
                    continue;
                }
            }
            bars.push(bar);
        }

        if incomplete > 0 {
            debug!(symbol, incomplete, "dropped bars missing OHLC values");
        }
        if out_of_order > 0 {
            warn!(symbol, out_of_order, "dropped bars with non-increasing timestamps");
        }

        Self {
            symbol: symbol.to_string(),
            bars,
        }
    }

    /// Builds a series from bars the caller already knows are ordered.
    pub fn from_bars(symbol: &str, bars: Vec<Bar>) -> Self {
        let records: Vec<PriceRecord> = bars
            .into_iter()
            .map(|b| PriceRecord {
                timestamp: b.timestamp,
                open: Some(b.open),
                high: Some(b.high),
                low: Some(b.low),
                close: Some(b.close),
                adj_close: None,
                volume: b.volume,
            })
            .collect();
        Self::from_records(symbol, &records)
    }

    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn bar(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn close(&self, index: usize) -> Option<f64> {
        self.bars.get(index).map(|b| b.close)
    }
}
