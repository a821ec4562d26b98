//! Result aggregation: trade statistics, equity curve, drawdown and Sharpe ratio.

use crate::domain::position::{ClosedTrade, TradingRecord};
use crate::domain::price_series::PriceSeries;
use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const NOISE_AMPLITUDE: f64 = 100.0;

/// Inputs to aggregation that do not come from the run itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationSettings {
    pub initial_capital: f64,
    /// Annual rate, converted to a per-bar rate for the Sharpe ratio.
    pub risk_free_rate: f64,
    pub equity_noise_seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub day: usize,
    pub value: f64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResult {
    #[serde(rename = "type")]
    pub trade_type: String,
    pub entry_date: String,
    pub entry_price: f64,
    pub exit_date: String,
    pub exit_price: f64,
    pub profit: f64,
    #[serde(rename = "return")]
    pub return_pct: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub profit_loss: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<TradeResult>,
}

impl BacktestResult {
    pub fn compute(
        series: &PriceSeries,
        record: &TradingRecord,
        settings: &AggregationSettings,
    ) -> Self {
        let closed = record.closed_trades();

        let total_trades = closed.len();
        let winning_trades = closed.iter().filter(|t| t.is_win()).count();
        let losing_trades = total_trades - winning_trades;
        let profit_loss: f64 = closed.iter().map(ClosedTrade::profit).sum();
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let trades = closed
            .iter()
            .map(|trade| trade_result(series, trade))
            .collect();

        let values = equity_values(series, record, settings);
        let max_drawdown = compute_max_drawdown(&values);
        let sharpe_ratio =
            compute_sharpe(&values, settings.risk_free_rate / TRADING_DAYS_PER_YEAR);

        let equity_curve = values
            .iter()
            .zip(series.bars())
            .enumerate()
            .map(|(i, (&value, bar))| EquityPoint {
                day: i + 1,
                value,
                date: curve_label(bar.timestamp),
            })
            .collect();

        BacktestResult {
            profit_loss,
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            max_drawdown,
            sharpe_ratio,
            equity_curve,
            trades,
        }
    }
}

fn trade_result(series: &PriceSeries, trade: &ClosedTrade) -> TradeResult {
    let date_of = |index: usize| {
        series
            .bar(index)
            .map(|b| b.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_default()
    };
    TradeResult {
        trade_type: "BUY".to_string(),
        entry_date: date_of(trade.entry_index),
        entry_price: trade.entry_price,
        exit_date: date_of(trade.exit_index),
        exit_price: trade.exit_price,
        profit: trade.profit(),
        return_pct: format!("{:.2}", trade.return_pct()),
    }
}

/// Three-letter upper-case month and day of month, e.g. `JAN 5`.
fn curve_label(timestamp: NaiveDateTime) -> String {
    format!(
        "{} {}",
        timestamp.format("%b").to_string().to_uppercase(),
        timestamp.format("%-d")
    )
}

/// Mark-to-market account value per bar: capital, plus realised P&L of trades
/// closed at or before the bar, plus the open position's unrealised P&L.
fn equity_values(
    series: &PriceSeries,
    record: &TradingRecord,
    settings: &AggregationSettings,
) -> Vec<f64> {
    let closed = record.closed_trades();
    let open = record.open_position();
    let mut rng = settings.equity_noise_seed.map(StdRng::seed_from_u64);

    let mut values = Vec::with_capacity(series.len());
    let mut realised = 0.0;
    let mut next_trade = 0;
    let mut noise = 0.0;

    for (i, bar) in series.bars().iter().enumerate() {
        while next_trade < closed.len() && closed[next_trade].exit_index <= i {
            realised += closed[next_trade].profit();
            next_trade += 1;
        }

        let holding = closed[next_trade..]
            .first()
            .filter(|t| t.entry_index <= i)
            .map(|t| bar.close - t.entry_price)
            .or_else(|| {
                open.filter(|p| p.entry_index <= i)
                    .map(|p| p.unrealized_pnl(bar.close))
            })
            .unwrap_or(0.0);

        if let Some(rng) = rng.as_mut() {
            noise += rng.gen_range(-NOISE_AMPLITUDE..NOISE_AMPLITUDE);
        }

        values.push(settings.initial_capital + realised + holding + noise);
    }
    values
}

/// Largest peak-to-trough decline, in percent of the peak.
fn compute_max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &value in values {
        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - value) / peak);
        }
    }
    max_dd * 100.0
}

fn compute_sharpe(values: &[f64], per_bar_rf: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = values
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        (mean - per_bar_rf) / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
