//! OHLCV bar representation.

use chrono::NaiveDateTime;

/// A raw row as delivered by a data provider. Any field may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub timestamp: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
}

/// A bar admitted into a [`PriceSeries`](crate::domain::price_series::PriceSeries).
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl Bar {
    /// Builds a bar from a provider record; `None` if O/H/L/C is missing or not finite.
    pub fn from_record(record: &PriceRecord) -> Option<Self> {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        Some(Bar {
            timestamp: record.timestamp,
            open: finite(record.open)?,
            high: finite(record.high)?,
            low: finite(record.low)?,
            close: finite(record.close)?,
            volume: finite(record.volume),
        })
    }

    /// Volume with a missing value read as zero.
    pub fn volume_or_zero(&self) -> f64 {
        self.volume.unwrap_or(0.0)
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// (high + low) / 2
    pub fn median_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample_bar() -> Bar {
        Bar {
            timestamp: ts(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: Some(50_000.0),
        }
    }

    fn full_record() -> PriceRecord {
        PriceRecord {
            timestamp: ts(),
            open: Some(100.0),
            high: Some(110.0),
            low: Some(90.0),
            close: Some(105.0),
            adj_close: Some(104.0),
            volume: Some(50_000.0),
        }
    }

    #[test]
    fn typical_price() {
        let bar = sample_bar();
        let expected = (110.0 + 90.0 + 105.0) / 3.0;
        assert!((bar.typical_price() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn median_price() {
        assert!((sample_bar().median_price() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_hl_dominates() {
        let bar = sample_bar();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((bar.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bar = sample_bar();
        // |110-70|=40 dominates
        assert!((bar.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let bar = sample_bar();
        // |90-130|=40 dominates
        assert!((bar.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn from_record_complete() {
        let bar = Bar::from_record(&full_record()).unwrap();
        assert_eq!(bar, sample_bar());
    }

    #[test]
    fn from_record_missing_close_is_dropped() {
        let record = PriceRecord {
            close: None,
            ..full_record()
        };
        assert!(Bar::from_record(&record).is_none());
    }

    #[test]
    fn from_record_nan_open_is_dropped() {
        let record = PriceRecord {
            open: Some(f64::NAN),
            ..full_record()
        };
        assert!(Bar::from_record(&record).is_none());
    }

    #[test]
    fn from_record_missing_volume_is_kept() {
        let record = PriceRecord {
            volume: None,
            adj_close: None,
            ..full_record()
        };
        let bar = Bar::from_record(&record).unwrap();
        assert_eq!(bar.volume, None);
        assert_eq!(bar.volume_or_zero(), 0.0);
    }
}
