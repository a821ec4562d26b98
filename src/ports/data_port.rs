//! Historical price data access.

use crate::domain::error::StrategistError;
use crate::domain::history_range::HistoryRange;
use crate::domain::ohlcv::PriceRecord;

pub trait DataPort {
    /// Rows for `symbol` at `interval`, oldest first, clipped to `range`.
    /// Rows may have missing fields; the caller filters them.
    fn fetch_history(
        &self,
        symbol: &str,
        range: HistoryRange,
        interval: &str,
    ) -> Result<Vec<PriceRecord>, StrategistError>;
}
