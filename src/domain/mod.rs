//! Core domain types and logic.

pub mod backtest;
pub mod batch;
pub mod config_validation;
pub mod error;
pub mod history_range;
pub mod indicator;
pub mod indicator_helpers;
pub mod metrics;
pub mod ohlcv;
pub mod position;
pub mod price_series;
pub mod rule;
pub mod rule_compiler;
pub mod rule_config;
pub mod strategy;
