//! Configuration validation and loading.
//!
//! Every value is checked before a run starts, so a bad INI file fails up
//! front rather than halfway through a batch.

use crate::domain::backtest::{BacktestSettings, DEFAULT_INITIAL_CAPITAL};
use crate::domain::batch::ScheduleSettings;
use crate::domain::error::StrategistError;
use crate::domain::history_range::HistoryRange;
use crate::ports::config_port::ConfigPort;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Csv,
    Sqlite,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Csv => f.write_str("csv"),
            DataSource::Sqlite => f.write_str("sqlite"),
        }
    }
}

pub fn validate_app_config(config: &dyn ConfigPort) -> Result<(), StrategistError> {
    validate_data_source(config)?;
    load_backtest_settings(config)?;
    load_schedule(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> StrategistError {
    StrategistError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn missing(section: &str, key: &str) -> StrategistError {
    StrategistError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn non_blank(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Which data provider `[data] source` selects (default `csv`).
pub fn data_source(config: &dyn ConfigPort) -> Result<DataSource, StrategistError> {
    let raw = non_blank(config, "data", "source").unwrap_or_else(|| "csv".to_string());
    match raw.to_lowercase().as_str() {
        "csv" => Ok(DataSource::Csv),
        "sqlite" if cfg!(feature = "sqlite") => Ok(DataSource::Sqlite),
        "sqlite" => Err(invalid(
            "data",
            "source",
            "sqlite support is not compiled in",
        )),
        other => Err(invalid(
            "data",
            "source",
            format!("unknown data source '{other}', expected csv or sqlite"),
        )),
    }
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), StrategistError> {
    match data_source(config)? {
        DataSource::Csv => csv_dir(config).map(|_| ()),
        DataSource::Sqlite => sqlite_path(config).map(|_| ()),
    }
}

pub fn csv_dir(config: &dyn ConfigPort) -> Result<String, StrategistError> {
    non_blank(config, "data", "csv_dir").ok_or_else(|| missing("data", "csv_dir"))
}

pub fn sqlite_path(config: &dyn ConfigPort) -> Result<String, StrategistError> {
    non_blank(config, "sqlite", "path").ok_or_else(|| missing("sqlite", "path"))
}

pub fn sqlite_pool_size(config: &dyn ConfigPort) -> Result<u32, StrategistError> {
    let size = config.get_int("sqlite", "pool_size", 4);
    if !(1..=64).contains(&size) {
        return Err(invalid("sqlite", "pool_size", "pool_size must be between 1 and 64"));
    }
    Ok(size as u32)
}

pub fn load_backtest_settings(config: &dyn ConfigPort) -> Result<BacktestSettings, StrategistError> {
    let initial_capital = config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL);
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }

    let risk_free_rate = config.get_double("backtest", "risk_free_rate", 0.0);
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }

    let equity_noise_seed = match non_blank(config, "backtest", "equity_noise_seed") {
        None => None,
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
            invalid(
                "backtest",
                "equity_noise_seed",
                format!("'{raw}' is not an unsigned integer"),
            )
        })?),
    };

    Ok(BacktestSettings {
        initial_capital,
        risk_free_rate,
        equity_noise_seed,
    })
}

pub fn load_schedule(config: &dyn ConfigPort) -> Result<ScheduleSettings, StrategistError> {
    let defaults = ScheduleSettings::default();
    let symbol = non_blank(config, "schedule", "symbol").unwrap_or(defaults.symbol);
    let range = non_blank(config, "schedule", "range").unwrap_or(defaults.range);
    let interval = non_blank(config, "schedule", "interval").unwrap_or(defaults.interval);

    range
        .parse::<HistoryRange>()
        .map_err(|e| invalid("schedule", "range", e.to_string()))?;

    Ok(ScheduleSettings {
        symbol,
        range,
        interval,
    })
}
