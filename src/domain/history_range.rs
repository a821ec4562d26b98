//! Lookback windows for history requests (`1mo`, `1y`, `ytd`, ...).

use crate::domain::error::StrategistError;
use crate::domain::ohlcv::PriceRecord;
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    Days(i64),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl HistoryRange {
    /// First timestamp inside the window that ends at `latest`, or `None` when
    /// the window is unbounded. A window reaching past the earliest
    /// representable date is unbounded too, so it behaves like `max`.
    pub fn window_start(&self, latest: NaiveDateTime) -> Option<NaiveDateTime> {
        match *self {
            HistoryRange::Days(n) => {
                Duration::try_days(n).and_then(|days| latest.checked_sub_signed(days))
            }
            HistoryRange::Months(n) => latest.checked_sub_months(Months::new(n)),
            HistoryRange::Years(n) => n
                .checked_mul(12)
                .and_then(|months| latest.checked_sub_months(Months::new(months))),
            HistoryRange::YearToDate => NaiveDate::from_ymd_opt(latest.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            HistoryRange::Max => None,
        }
    }

    /// Keeps the records inside the window ending at the latest record.
    pub fn clip(&self, mut records: Vec<PriceRecord>) -> Vec<PriceRecord> {
        let Some(latest) = records.iter().map(|r| r.timestamp).max() else {
            return records;
        };
        if let Some(start) = self.window_start(latest) {
            records.retain(|r| r.timestamp >= start);
        }
        records
    }
}

impl FromStr for HistoryRange {
    type Err = StrategistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_lowercase();
        let invalid = || StrategistError::InvalidRequest {
            reason: format!("unsupported range '{s}'"),
        };

        match raw.as_str() {
            "max" => return Ok(HistoryRange::Max),
            "ytd" => return Ok(HistoryRange::YearToDate),
            _ => {}
        }

        let split = raw
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (count, unit) = raw.split_at(split);
        let count: u32 = count.parse().map_err(|_| invalid())?;
        if count == 0 {
            return Err(invalid());
        }

        match unit {
            "d" => Ok(HistoryRange::Days(count as i64)),
            "mo" => Ok(HistoryRange::Months(count)),
            "y" => Ok(HistoryRange::Years(count)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryRange::Days(n) => write!(f, "{}d", n),
            HistoryRange::Months(n) => write!(f, "{}mo", n),
            HistoryRange::Years(n) => write!(f, "{}y", n),
            HistoryRange::YearToDate => write!(f, "ytd"),
            HistoryRange::Max => write!(f, "max"),
        }
    }
}
