//! SQLite adapter: price history, saved strategies and run results.

use crate::domain::error::StrategistError;
use crate::domain::history_range::HistoryRange;
use crate::domain::ohlcv::PriceRecord;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::strategy_store_port::{StoredStrategy, StrategyRunSummary, StrategyStore};
use chrono::{NaiveDateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rand::RngCore;
use rusqlite::{params, OptionalExtension};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> StrategistError {
    StrategistError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> StrategistError {
    StrategistError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn format_ts(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_ts(raw: &str, column: usize) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// 16 random bytes, hex encoded.
fn new_strategy_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StrategistError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| StrategistError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).clamp(1, 64) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, StrategistError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StrategistError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn initialize_schema(&self) -> Result<(), StrategistError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS prices (
                    symbol TEXT NOT NULL,
                    bar_interval TEXT NOT NULL,
                    ts TEXT NOT NULL,
                    open REAL,
                    high REAL,
                    low REAL,
                    close REAL,
                    adj_close REAL,
                    volume REAL,
                    PRIMARY KEY (symbol, bar_interval, ts)
                );
                CREATE TABLE IF NOT EXISTS saved_strategies (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    rules_json TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS strategy_run_results (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    strategy_id TEXT NOT NULL,
                    strategy_name TEXT NOT NULL,
                    symbol TEXT NOT NULL,
                    history_range TEXT NOT NULL,
                    bar_interval TEXT NOT NULL,
                    profit_loss REAL NOT NULL,
                    total_trades INTEGER NOT NULL,
                    win_rate REAL NOT NULL,
                    ran_at TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_runs_strategy ON strategy_run_results(strategy_id);",
            )
            .map_err(query_error)
    }

    pub fn insert_records(
        &self,
        symbol: &str,
        interval: &str,
        records: &[PriceRecord],
    ) -> Result<(), StrategistError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        for r in records {
            tx.execute(
                "INSERT OR REPLACE INTO prices
                 (symbol, bar_interval, ts, open, high, low, close, adj_close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    symbol,
                    interval,
                    format_ts(r.timestamp),
                    r.open,
                    r.high,
                    r.low,
                    r.close,
                    r.adj_close,
                    r.volume
                ],
            )
            .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)
    }
}

impl DataPort for SqliteAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        range: HistoryRange,
        interval: &str,
    ) -> Result<Vec<PriceRecord>, StrategistError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT ts, open, high, low, close, adj_close, volume
                 FROM prices
                 WHERE symbol = ?1 AND bar_interval = ?2
                 ORDER BY ts ASC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![symbol, interval], |row| {
                let ts: String = row.get(0)?;
                Ok(PriceRecord {
                    timestamp: parse_ts(&ts, 0)?,
                    open: row.get(1)?,
                    high: row.get(2)?,
                    low: row.get(3)?,
                    close: row.get(4)?,
                    adj_close: row.get(5)?,
                    volume: row.get(6)?,
                })
            })
            .map_err(query_error)?;

        let records = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error)?;
        Ok(range.clip(records))
    }
}

fn strategy_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredStrategy> {
    let created_at: String = row.get(3)?;
    Ok(StoredStrategy {
        id: row.get(0)?,
        name: row.get(1)?,
        rules_json: row.get(2)?,
        created_at: parse_ts(&created_at, 3)?,
    })
}

impl StrategyStore for SqliteAdapter {
    fn save_strategy(&self, name: &str, rules_json: &str) -> Result<String, StrategistError> {
        let id = new_strategy_id();
        self.conn()?
            .execute(
                "INSERT INTO saved_strategies (id, name, rules_json, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, name, rules_json, format_ts(Utc::now().naive_utc())],
            )
            .map_err(query_error)?;
        Ok(id)
    }

    fn get_strategy(&self, id: &str) -> Result<StoredStrategy, StrategistError> {
        self.conn()?
            .query_row(
                "SELECT id, name, rules_json, created_at FROM saved_strategies WHERE id = ?1",
                params![id],
                strategy_from_row,
            )
            .optional()
            .map_err(query_error)?
            .ok_or_else(|| StrategistError::StrategyNotFound { id: id.to_string() })
    }

    fn list_strategies(&self) -> Result<Vec<StoredStrategy>, StrategistError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, rules_json, created_at
                 FROM saved_strategies
                 ORDER BY created_at ASC, name ASC",
            )
            .map_err(query_error)?;
        let rows = stmt.query_map([], strategy_from_row).map_err(query_error)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }

    fn delete_strategy(&self, id: &str) -> Result<(), StrategistError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;
        let deleted = tx
            .execute("DELETE FROM saved_strategies WHERE id = ?1", params![id])
            .map_err(query_error)?;
        if deleted == 0 {
            return Err(StrategistError::StrategyNotFound { id: id.to_string() });
        }
        tx.execute(
            "DELETE FROM strategy_run_results WHERE strategy_id = ?1",
            params![id],
        )
        .map_err(query_error)?;
        tx.commit().map_err(query_error)
    }

    fn record_run(&self, summary: &StrategyRunSummary) -> Result<(), StrategistError> {
        self.conn()?
            .execute(
                "INSERT INTO strategy_run_results
                 (strategy_id, strategy_name, symbol, history_range, bar_interval,
                  profit_loss, total_trades, win_rate, ran_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    summary.strategy_id,
                    summary.strategy_name,
                    summary.symbol,
                    summary.range,
                    summary.interval,
                    summary.profit_loss,
                    summary.total_trades as i64,
                    summary.win_rate,
                    format_ts(summary.ran_at)
                ],
            )
            .map_err(query_error)?;
        Ok(())
    }

    fn list_runs(&self, strategy_id: &str) -> Result<Vec<StrategyRunSummary>, StrategistError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT strategy_id, strategy_name, symbol, history_range, bar_interval,
                        profit_loss, total_trades, win_rate, ran_at
                 FROM strategy_run_results
                 WHERE strategy_id = ?1
                 ORDER BY ran_at DESC, id DESC",
            )
            .map_err(query_error)?;

        let rows = stmt
            .query_map(params![strategy_id], |row| {
                let total_trades: i64 = row.get(6)?;
                let ran_at: String = row.get(8)?;
                Ok(StrategyRunSummary {
                    strategy_id: row.get(0)?,
                    strategy_name: row.get(1)?,
                    symbol: row.get(2)?,
                    range: row.get(3)?,
                    interval: row.get(4)?,
                    profit_loss: row.get(5)?,
                    total_trades: total_trades.max(0) as usize,
                    win_rate: row.get(7)?,
                    ran_at: parse_ts(&ran_at, 8)?,
                })
            })
            .map_err(query_error)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(query_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    struct EmptyConfig;

    impl ConfigPort for EmptyConfig {
        fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
            None
        }
        fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
            default
        }
        fn get_double(&self, _section: &str, _key: &str, default: f64) -> f64 {
            default
        }
        fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
            default
        }
    }

    fn day(n: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(n)
    }

    fn record(n: i64, close: Option<f64>) -> PriceRecord {
        PriceRecord {
            timestamp: day(n),
            open: Some(100.0),
            high: Some(101.0),
            low: Some(99.0),
            close,
            adj_close: None,
            volume: Some(1000.0),
        }
    }

    fn summary(id: &str, ran_at: NaiveDateTime, profit_loss: f64) -> StrategyRunSummary {
        StrategyRunSummary {
            strategy_id: id.to_string(),
            strategy_name: "rsi dip".to_string(),
            symbol: "TCS.NS".to_string(),
            range: "1y".to_string(),
            interval: "1d".to_string(),
            profit_loss,
            total_trades: 3,
            win_rate: 66.0,
            ran_at,
        }
    }

    #[test]
    fn from_config_missing_path() {
        match SqliteAdapter::from_config(&EmptyConfig) {
            Err(StrategistError::ConfigMissing { section, key }) => {
                assert_eq!(section, "sqlite");
                assert_eq!(key, "path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn fetch_history_keeps_nullable_columns() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter
            .insert_records("TCS.NS", "1d", &[record(1, None), record(0, Some(100.5))])
            .unwrap();
        adapter
            .insert_records("TCS.NS", "1wk", &[record(0, Some(1.0))])
            .unwrap();

        let fetched = adapter
            .fetch_history("TCS.NS", HistoryRange::Max, "1d")
            .unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].timestamp, day(0));
        assert_eq!(fetched[0].close, Some(100.5));
        assert_eq!(fetched[1].close, None);
    }

    #[test]
    fn fetch_history_clips_to_range() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        let records: Vec<PriceRecord> = (0..30).map(|n| record(n, Some(1.0))).collect();
        adapter.insert_records("TCS.NS", "1d", &records).unwrap();

        let fetched = adapter
            .fetch_history("TCS.NS", HistoryRange::Days(5), "1d")
            .unwrap();
        assert_eq!(fetched.len(), 6);
        assert!(adapter
            .fetch_history("OTHER", HistoryRange::Max, "1d")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn strategy_crud() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        let id = adapter.save_strategy("rsi dip", r#"{"entryRules":{}}"#).unwrap();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));

        let stored = adapter.get_strategy(&id).unwrap();
        assert_eq!(stored.name, "rsi dip");
        assert_eq!(stored.rules_json, r#"{"entryRules":{}}"#);

        let other = adapter.save_strategy("breakout", "{}").unwrap();
        assert_ne!(id, other);
        assert_eq!(adapter.list_strategies().unwrap().len(), 2);

        adapter.delete_strategy(&id).unwrap();
        assert!(matches!(
            adapter.get_strategy(&id),
            Err(StrategistError::StrategyNotFound { .. })
        ));
        assert!(matches!(
            adapter.delete_strategy(&id),
            Err(StrategistError::StrategyNotFound { .. })
        ));
        assert_eq!(adapter.list_strategies().unwrap().len(), 1);
    }

    #[test]
    fn runs_are_listed_newest_first_and_deleted_with_strategy() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        let id = adapter.save_strategy("rsi dip", "{}").unwrap();

        adapter.record_run(&summary(&id, day(0), 1.5)).unwrap();
        adapter.record_run(&summary(&id, day(1), -2.0)).unwrap();
        adapter.record_run(&summary("other", day(2), 9.0)).unwrap();

        let runs = adapter.list_runs(&id).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].ran_at, day(1));
        assert_eq!(runs[0].profit_loss, -2.0);
        assert_eq!(runs[1], summary(&id, day(0), 1.5));

        adapter.delete_strategy(&id).unwrap();
        assert!(adapter.list_runs(&id).unwrap().is_empty());
        assert_eq!(adapter.list_runs("other").unwrap().len(), 1);
    }
}
