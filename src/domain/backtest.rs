//! Backtest simulation and the request-level service around it.
//!
//! The simulator is a two-state machine (flat / in position) stepped once per
//! bar. On each bar it evaluates exactly one predicate: entry while flat, exit
//! while holding. A bar that closes a position therefore never reopens one.

use crate::domain::error::StrategistError;
use crate::domain::history_range::HistoryRange;
use crate::domain::indicator::engine::IndicatorEngine;
use crate::domain::metrics::{AggregationSettings, BacktestResult};
use crate::domain::position::TradingRecord;
use crate::domain::price_series::PriceSeries;
use crate::domain::rule_config::{BacktestRequest, RulesConfig};
use crate::domain::strategy::Strategy;
use crate::ports::data_port::DataPort;
use tracing::{debug, info};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestSettings {
    pub initial_capital: f64,
    pub risk_free_rate: f64,
    pub equity_noise_seed: Option<u64>,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            risk_free_rate: 0.0,
            equity_noise_seed: None,
        }
    }
}

impl From<&BacktestSettings> for AggregationSettings {
    fn from(settings: &BacktestSettings) -> Self {
        AggregationSettings {
            initial_capital: settings.initial_capital,
            risk_free_rate: settings.risk_free_rate,
            equity_noise_seed: settings.equity_noise_seed,
        }
    }
}

/// Steps `strategy` across `series`, buying and selling at each bar's close.
pub fn simulate(series: &PriceSeries, strategy: &Strategy) -> Result<TradingRecord, StrategistError> {
    if series.is_empty() {
        return Err(StrategistError::NoData {
            symbol: series.symbol().to_string(),
        });
    }

    let mut record = TradingRecord::new();
    for (i, bar) in series.bars().iter().enumerate() {
        if record.is_flat() {
            if strategy.entry.is_satisfied(i) {
                record.enter(i, bar.close);
            }
        } else if strategy.exit.is_satisfied(i) {
            record.exit(i, bar.close);
        }
    }

    debug!(
        symbol = series.symbol(),
        closed = record.closed_trades().len(),
        open = !record.is_flat(),
        "simulation finished"
    );
    Ok(record)
}

/// Compiles and simulates against an already-loaded series.
pub fn run_backtest(
    series: &PriceSeries,
    entry: Option<&RulesConfig>,
    exit: Option<&RulesConfig>,
    settings: &BacktestSettings,
) -> Result<BacktestResult, StrategistError> {
    if series.is_empty() {
        return Err(StrategistError::NoData {
            symbol: series.symbol().to_string(),
        });
    }

    let entry = RulesConfig::to_group(entry)?;
    let exit = RulesConfig::to_group(exit)?;

    let mut engine = IndicatorEngine::new(series);
    let strategy = Strategy::compile(&entry, &exit, &mut engine)?;
    let record = simulate(series, &strategy)?;
    Ok(BacktestResult::compute(series, &record, &settings.into()))
}

/// Fetches the requested history and runs the request's rules over it.
pub fn run_backtest_request(
    data: &dyn DataPort,
    request: &BacktestRequest,
    settings: &BacktestSettings,
) -> Result<BacktestResult, StrategistError> {
    let range: HistoryRange = request.range.parse()?;
    info!(
        symbol = %request.stock_symbol,
        range = %range,
        interval = %request.interval,
        "starting backtest"
    );

    let records = data.fetch_history(&request.stock_symbol, range, &request.interval)?;
    let series = PriceSeries::from_records(&request.stock_symbol, &records);
    let result = run_backtest(
        &series,
        request.entry.as_ref(),
        request.exit.as_ref(),
        settings,
    )?;

    info!(
        symbol = %request.stock_symbol,
        bars = series.len(),
        trades = result.total_trades,
        profit_loss = result.profit_loss,
        "backtest finished"
    );
    Ok(result)
}
