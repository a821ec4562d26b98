//! CSV file data adapter.
//!
//! One file per symbol and interval: `<dir>/<SYMBOL>_<interval>.csv` with a
//! header row naming `date,open,high,low,close,adj_close,volume`. Columns are
//! located by header name; `adj_close` and `volume` may be absent entirely.

use crate::domain::error::StrategistError;
use crate::domain::history_range::HistoryRange;
use crate::domain::ohlcv::PriceRecord;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: Option<usize>,
    adj_close: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, StrategistError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let date = find("date").ok_or_else(|| StrategistError::Database {
            reason: "missing date column".into(),
        })?;
        Ok(Self {
            date,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            close: find("close"),
            adj_close: find("adj_close"),
            volume: find("volume"),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, interval))
    }
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, StrategistError> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|e| StrategistError::Database {
            reason: format!("invalid date '{}': {}", raw, e),
        })
}

/// Empty and `null` cells are missing values, not errors.
fn parse_cell(
    record: &csv::StringRecord,
    column: Option<usize>,
    name: &str,
) -> Result<Option<f64>, StrategistError> {
    let Some(raw) = column.and_then(|i| record.get(i)).map(str::trim) else {
        return Ok(None);
    };
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|e| StrategistError::Database {
            reason: format!("invalid {} value '{}': {}", name, raw, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        range: HistoryRange,
        interval: &str,
    ) -> Result<Vec<PriceRecord>, StrategistError> {
        let path = self.csv_path(symbol, interval);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StrategistError::NoData {
                    symbol: symbol.to_string(),
                });
            }
            Err(e) => {
                return Err(StrategistError::Database {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| StrategistError::Database {
            reason: format!("CSV header error: {}", e),
        })?;
        let columns = Columns::from_headers(headers)?;

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result.map_err(|e| StrategistError::Database {
                reason: format!("CSV parse error: {}", e),
            })?;
            let date = row.get(columns.date).ok_or_else(|| StrategistError::Database {
                reason: "missing date value".into(),
            })?;

            records.push(PriceRecord {
                timestamp: parse_timestamp(date)?,
                open: parse_cell(&row, columns.open, "open")?,
                high: parse_cell(&row, columns.high, "high")?,
                low: parse_cell(&row, columns.low, "low")?,
                close: parse_cell(&row, columns.close, "close")?,
                adj_close: parse_cell(&row, columns.adj_close, "adj_close")?,
                volume: parse_cell(&row, columns.volume, "volume")?,
            });
        }

        records.sort_by_key(|r| r.timestamp);
        Ok(range.clip(records))
    }
}
