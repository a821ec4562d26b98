//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::backtest::run_backtest_request;
use crate::domain::config_validation::{
    csv_dir, data_source, load_backtest_settings, validate_app_config, DataSource,
};
use crate::domain::error::StrategistError;
use crate::domain::history_range::HistoryRange;
use crate::domain::indicator::engine::IndicatorEngine;
use crate::domain::metrics::BacktestResult;
use crate::domain::price_series::PriceSeries;
use crate::domain::rule_config::{BacktestRequest, RulesConfig};
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "strategist", about = "Rule-tree strategy backtester")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest request against configured price data
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Request JSON: {stockSymbol, range, interval, entry, exit}
        #[arg(short, long)]
        request: PathBuf,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a request's rule trees without fetching data
    Validate {
        #[arg(short, long)]
        request: PathBuf,
    },
    /// Manage saved strategies
    #[cfg(feature = "sqlite")]
    Strategy {
        #[arg(short, long)]
        config: PathBuf,
        #[command(subcommand)]
        action: StrategyAction,
    },
    /// Run every saved strategy once against the [schedule] market
    #[cfg(feature = "sqlite")]
    RunSaved {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[cfg(feature = "sqlite")]
#[derive(Subcommand, Debug)]
pub enum StrategyAction {
    /// Store a saved-strategy JSON file ({entryRules, exitRules})
    Save {
        #[arg(long)]
        name: String,
        #[arg(short, long)]
        file: PathBuf,
    },
    List,
    Show { id: String },
    Delete { id: String },
    /// Recorded runs of one strategy, newest first
    Runs { id: String },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            request,
            output,
        } => run_backtest(&config, &request, output.as_deref()),
        Command::Validate { request } => run_validate(&request),
        #[cfg(feature = "sqlite")]
        Command::Strategy { config, action } => saved::run_strategy_action(&config, action),
        #[cfg(feature = "sqlite")]
        Command::RunSaved { config } => saved::run_saved(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StrategistError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_app_config(&adapter)?;
    Ok(adapter)
}

pub fn read_request(path: &Path) -> Result<BacktestRequest, StrategistError> {
    BacktestRequest::from_json(&fs::read_to_string(path)?)
}

pub fn open_data_port(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, StrategistError> {
    match data_source(config)? {
        DataSource::Csv => Ok(Box::new(CsvAdapter::new(PathBuf::from(csv_dir(config)?)))),
        #[cfg(feature = "sqlite")]
        DataSource::Sqlite => Ok(Box::new(
            crate::adapters::sqlite_adapter::SqliteAdapter::from_config(config)?,
        )),
        #[cfg(not(feature = "sqlite"))]
        DataSource::Sqlite => Err(StrategistError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: "sqlite support is not compiled in".into(),
        }),
    }
}

/// Compiles both trees against an empty series; returns their leaf counts.
pub fn check_rules(
    entry: Option<&RulesConfig>,
    exit: Option<&RulesConfig>,
) -> Result<(usize, usize), StrategistError> {
    let entry = RulesConfig::to_group(entry)?;
    let exit = RulesConfig::to_group(exit)?;
    let series = PriceSeries::empty("");
    let mut engine = IndicatorEngine::new(&series);
    Strategy::compile(&entry, &exit, &mut engine)?;
    Ok((entry.leaf_count(), exit.leaf_count()))
}

fn print_summary(request: &BacktestRequest, result: &BacktestResult) {
    eprintln!(
        "\n=== {} ({} / {}) ===",
        request.stock_symbol, request.range, request.interval
    );
    eprintln!("Profit/Loss:      {:.2}", result.profit_loss);
    eprintln!(
        "Trades:           {} ({} won, {} lost)",
        result.total_trades, result.winning_trades, result.losing_trades
    );
    eprintln!("Win Rate:         {:.1}%", result.win_rate);
    eprintln!("Max Drawdown:     -{:.2}%", result.max_drawdown);
    eprintln!("Sharpe Ratio:     {:.2}", result.sharpe_ratio);
}

fn run_backtest(
    config_path: &Path,
    request_path: &Path,
    output_path: Option<&Path>,
) -> Result<(), StrategistError> {
    let config = load_config(config_path)?;
    let settings = load_backtest_settings(&config)?;
    let request = read_request(request_path)?;
    let data = open_data_port(&config)?;

    let result = run_backtest_request(data.as_ref(), &request, &settings)?;
    print_summary(&request, &result);

    match output_path {
        Some(path) => {
            JsonReportAdapter.write(&result, &request, &path.display().to_string())?;
            eprintln!("Report written to {}", path.display());
        }
        None => println!("{}", JsonReportAdapter::render(&result, &request)?),
    }
    Ok(())
}

fn run_validate(request_path: &Path) -> Result<(), StrategistError> {
    let request = read_request(request_path)?;
    request.range.parse::<HistoryRange>()?;
    let (entry, exit) = check_rules(request.entry.as_ref(), request.exit.as_ref())?;
    println!("ok: {entry} entry rule(s), {exit} exit rule(s)");
    Ok(())
}

#[cfg(feature = "sqlite")]
mod saved {
    use super::*;
    use crate::adapters::sqlite_adapter::SqliteAdapter;
    use crate::domain::batch::run_saved_strategies;
    use crate::domain::config_validation::{load_schedule, sqlite_path};
    use crate::domain::rule_config::SavedStrategy;
    use crate::ports::strategy_store_port::StrategyStore;

    fn open_store(config: &dyn ConfigPort) -> Result<SqliteAdapter, StrategistError> {
        sqlite_path(config)?;
        SqliteAdapter::from_config(config)
    }

    pub(super) fn run_strategy_action(
        config_path: &Path,
        action: StrategyAction,
    ) -> Result<(), StrategistError> {
        let config = FileConfigAdapter::from_file(config_path)?;
        let store = open_store(&config)?;

        match action {
            StrategyAction::Save { name, file } => {
                let json = fs::read_to_string(&file)?;
                let saved = SavedStrategy::from_json(&json)?;
                check_rules(saved.entry_config().as_ref(), saved.exit_config().as_ref())?;
                let id = store.save_strategy(&name, &json)?;
                println!("{id}");
            }
            StrategyAction::List => {
                for s in store.list_strategies()? {
                    println!("{}\t{}\t{}", s.id, s.name, s.created_at);
                }
            }
            StrategyAction::Show { id } => {
                let stored = store.get_strategy(&id)?;
                let value: serde_json::Value = serde_json::from_str(&stored.rules_json)?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            StrategyAction::Delete { id } => {
                store.delete_strategy(&id)?;
                eprintln!("Deleted {id}");
            }
            StrategyAction::Runs { id } => {
                store.get_strategy(&id)?;
                for run in store.list_runs(&id)? {
                    println!(
                        "{}\t{}\t{}\t{}\t{:.2}\t{}\t{:.1}",
                        run.ran_at,
                        run.symbol,
                        run.range,
                        run.interval,
                        run.profit_loss,
                        run.total_trades,
                        run.win_rate
                    );
                }
            }
        }
        Ok(())
    }

    pub(super) fn run_saved(config_path: &Path) -> Result<(), StrategistError> {
        let config = load_config(config_path)?;
        let settings = load_backtest_settings(&config)?;
        let schedule = load_schedule(&config)?;
        let store = open_store(&config)?;
        let data = open_data_port(&config)?;

        let summary = run_saved_strategies(&store, data.as_ref(), &schedule, &settings)?;
        eprintln!(
            "Ran {} strategies: {} succeeded, {} failed",
            summary.total(),
            summary.succeeded.len(),
            summary.failed.len()
        );
        for failure in &summary.failed {
            eprintln!(
                "  {} ({}): {}",
                failure.strategy_name, failure.strategy_id, failure.error
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backtest_command() {
        let cli = Cli::parse_from([
            "strategist",
            "-v",
            "backtest",
            "-c",
            "app.ini",
            "-r",
            "request.json",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Backtest {
                config,
                request,
                output,
            } => {
                assert_eq!(config, PathBuf::from("app.ini"));
                assert_eq!(request, PathBuf::from("request.json"));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn check_rules_reports_leaf_counts() {
        let entry: RulesConfig = serde_json::from_str(
            r#"{"rules": [
                {"indicator": "RSI", "operator": "<", "value": 30},
                {"condition": "OR", "rules": [
                    {"indicator": "CLOSE", "operator": "crossesUp", "compareIndicator": "SMA"},
                    {"indicator": "MACD", "operator": ">", "value": "0"}
                ]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(check_rules(Some(&entry), None).unwrap(), (3, 0));
    }

    #[test]
    fn check_rules_surfaces_compile_errors() {
        let entry: RulesConfig = serde_json::from_str(
            r#"{"rules": [{"indicator": "RSI", "operator": "<", "value": "low"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            check_rules(Some(&entry), None),
            Err(StrategistError::InvalidRuleValue { .. })
        ));
    }
}
