//! Runs every saved strategy once against the scheduled market.
//!
//! Each strategy is isolated: a failure is logged and collected, and the
//! batch moves on to the next strategy.

use crate::domain::backtest::{run_backtest_request, BacktestSettings};
use crate::domain::error::StrategistError;
use crate::domain::rule_config::{BacktestRequest, SavedStrategy};
use crate::ports::data_port::DataPort;
use crate::ports::strategy_store_port::{StoredStrategy, StrategyRunSummary, StrategyStore};
use chrono::{NaiveDateTime, Utc};
use tracing::{error, info};

pub const DEFAULT_SYMBOL: &str = "TCS.NS";
pub const DEFAULT_RANGE: &str = "1y";
pub const DEFAULT_INTERVAL: &str = "1d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSettings {
    pub symbol: String,
    pub range: String,
    pub interval: String,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            range: DEFAULT_RANGE.to_string(),
            interval: DEFAULT_INTERVAL.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct StrategyFailure {
    pub strategy_id: String,
    pub strategy_name: String,
    pub error: StrategistError,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<StrategyRunSummary>,
    pub failed: Vec<StrategyFailure>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Builds the request a saved strategy runs with under `schedule`.
pub fn scheduled_request(
    stored: &StoredStrategy,
    schedule: &ScheduleSettings,
) -> Result<BacktestRequest, StrategistError> {
    let saved = SavedStrategy::from_json(&stored.rules_json)?;
    Ok(BacktestRequest {
        stock_symbol: schedule.symbol.clone(),
        range: schedule.range.clone(),
        interval: schedule.interval.clone(),
        entry: saved.entry_config(),
        exit: saved.exit_config(),
    })
}

fn run_one(
    stored: &StoredStrategy,
    store: &dyn StrategyStore,
    data: &dyn DataPort,
    schedule: &ScheduleSettings,
    settings: &BacktestSettings,
    ran_at: NaiveDateTime,
) -> Result<StrategyRunSummary, StrategistError> {
    let request = scheduled_request(stored, schedule)?;
    let result = run_backtest_request(data, &request, settings)?;

    let summary = StrategyRunSummary {
        strategy_id: stored.id.clone(),
        strategy_name: stored.name.clone(),
        symbol: request.stock_symbol,
        range: request.range,
        interval: request.interval,
        profit_loss: result.profit_loss,
        total_trades: result.total_trades,
        win_rate: result.win_rate,
        ran_at,
    };
    store.record_run(&summary)?;
    Ok(summary)
}

pub fn run_saved_strategies(
    store: &dyn StrategyStore,
    data: &dyn DataPort,
    schedule: &ScheduleSettings,
    settings: &BacktestSettings,
) -> Result<BatchSummary, StrategistError> {
    let strategies = store.list_strategies()?;
    info!(count = strategies.len(), symbol = %schedule.symbol, "running saved strategies");

    let mut summary = BatchSummary::default();
    for stored in &strategies {
        let ran_at = Utc::now().naive_utc();
        match run_one(stored, store, data, schedule, settings, ran_at) {
            Ok(run) => {
                info!(
                    strategy = %stored.name,
                    profit_loss = run.profit_loss,
                    trades = run.total_trades,
                    "strategy run recorded"
                );
                summary.succeeded.push(run);
            }
            Err(e) => {
                error!(strategy_id = %stored.id, strategy = %stored.name, error = %e, "strategy run failed");
                summary.failed.push(StrategyFailure {
                    strategy_id: stored.id.clone(),
                    strategy_name: stored.name.clone(),
                    error: e,
                });
            }
        }
    }

    info!(
        succeeded = summary.succeeded.len(),
        failed = summary.failed.len(),
        "batch finished"
    );
    Ok(summary)
}
