//! Saved strategies and their run history.

use crate::domain::error::StrategistError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredStrategy {
    pub id: String,
    pub name: String,
    /// Saved-strategy JSON (`{entryRules, exitRules}`), kept verbatim.
    pub rules_json: String,
    pub created_at: NaiveDateTime,
}

/// Outcome of one scheduled run of a saved strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRunSummary {
    pub strategy_id: String,
    pub strategy_name: String,
    pub symbol: String,
    pub range: String,
    pub interval: String,
    pub profit_loss: f64,
    pub total_trades: usize,
    pub win_rate: f64,
    pub ran_at: NaiveDateTime,
}

pub trait StrategyStore {
    /// Stores a strategy and returns its new opaque id.
    fn save_strategy(&self, name: &str, rules_json: &str) -> Result<String, StrategistError>;

    fn get_strategy(&self, id: &str) -> Result<StoredStrategy, StrategistError>;

    fn list_strategies(&self) -> Result<Vec<StoredStrategy>, StrategistError>;

    fn delete_strategy(&self, id: &str) -> Result<(), StrategistError>;

    fn record_run(&self, summary: &StrategyRunSummary) -> Result<(), StrategistError>;

    /// Runs of one strategy, newest first.
    fn list_runs(&self, strategy_id: &str) -> Result<Vec<StrategyRunSummary>, StrategistError>;
}
