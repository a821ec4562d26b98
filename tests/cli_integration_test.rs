//! CLI integration tests for command orchestration.
//!
//! Tests cover:
//! - Config loading and validation from INI files on disk
//! - Request reading and rule checking
//! - Data port selection
//! - Full `backtest` command against a CSV directory
//! - Saved-strategy commands against an on-disk SQLite file

mod common;

use clap::Parser;
use common::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use strategist::cli::{self, Cli};
use strategist::domain::error::StrategistError;
use strategist::domain::history_range::HistoryRange;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const REQUEST: &str = r#"{
    "stockSymbol": "TCS.NS",
    "range": "max",
    "interval": "1d",
    "entry": {"condition": "AND", "rules": [
        {"indicator": "CLOSE", "operator": "crossesUp", "compareType": "indicator",
         "compareIndicator": "SMA", "compareParams": [{"name": "period", "value": "5"}]}
    ]},
    "exit": {"condition": "AND", "rules": [
        {"indicator": "CLOSE", "operator": "crossesDown", "compareType": "indicator",
         "compareIndicator": "SMA", "compareParams": [{"name": "period", "value": "5"}]}
    ]}
}"#;

/// A CSV price directory plus an INI pointing at it.
fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let mut body = String::from("date,open,high,low,close,volume\n");
    for r in records_from_closes(&wave(120)) {
        let c = r.close.unwrap();
        body.push_str(&format!(
            "{},{},{},{},{},{}\n",
            r.timestamp.format("%Y-%m-%d"),
            c,
            c + 1.0,
            c - 1.0,
            c,
            r.volume.unwrap()
        ));
    }
    fs::write(dir.path().join("TCS.NS_1d.csv"), body).unwrap();
    fs::write(
        dir.path().join("app.ini"),
        format!(
            "[data]\nsource = csv\ncsv_dir = {}\n\n[backtest]\ninitial_capital = 100000\nrisk_free_rate = 0.05\n",
            dir.path().display()
        ),
    )
    .unwrap();
    fs::write(dir.path().join("request.json"), REQUEST).unwrap();
    dir
}

fn run(args: &[&str]) -> ExitCode {
    let mut argv = vec!["strategist"];
    argv.extend_from_slice(args);
    cli::run(Cli::parse_from(argv))
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

mod config_loading {
    use super::*;

    #[test]
    fn valid_ini_loads() {
        let file = write_temp_ini("[data]\ncsv_dir = /var/lib/prices\n");
        assert!(cli::load_config(file.path()).is_ok());
    }

    #[test]
    fn bad_capital_is_rejected() {
        let file = write_temp_ini("[data]\ncsv_dir = x\n[backtest]\ninitial_capital = -5\n");
        let err = cli::load_config(file.path()).unwrap_err();
        assert!(matches!(err, StrategistError::ConfigInvalid { ref key, .. } if key == "initial_capital"));
    }

    #[test]
    fn bad_schedule_range_is_rejected() {
        let file = write_temp_ini("[data]\ncsv_dir = x\n[schedule]\nrange = forever\n");
        let err = cli::load_config(file.path()).unwrap_err();
        assert!(matches!(err, StrategistError::ConfigInvalid { ref section, .. } if section == "schedule"));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let file = write_temp_ini("[data]\nsource = parquet\ncsv_dir = x\n");
        assert!(matches!(
            cli::load_config(file.path()),
            Err(StrategistError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn missing_file_is_parse_error() {
        let err = cli::load_config(Path::new("/nonexistent/app.ini")).unwrap_err();
        assert!(matches!(err, StrategistError::ConfigParse { .. }));
    }
}

mod requests {
    use super::*;

    #[test]
    fn read_request_parses_json_file() {
        let dir = workspace();
        let request = cli::read_request(&dir.path().join("request.json")).unwrap();
        assert_eq!(request.stock_symbol, "TCS.NS");
        assert_eq!(request.range.parse::<HistoryRange>().unwrap(), HistoryRange::Max);
        assert_eq!(
            cli::check_rules(request.entry.as_ref(), request.exit.as_ref()).unwrap(),
            (1, 1)
        );
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"stockSymbol\": ").unwrap();
        assert!(matches!(
            cli::read_request(&path),
            Err(StrategistError::Json(_))
        ));
    }

    #[test]
    fn check_rules_rejects_unknown_indicator() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"{"stockSymbol": "X", "range": "1y", "interval": "1d",
                "entry": {"rules": [{"indicator": "Bolinger", "operator": ">", "value": 1}]}}"#,
        )
        .unwrap();
        let request = cli::read_request(&path).unwrap();
        let err = cli::check_rules(request.entry.as_ref(), None).unwrap_err();
        assert!(matches!(err, StrategistError::UnknownIndicator { ref name } if name == "Bolinger"));
    }
}

mod data_ports {
    use super::*;

    #[test]
    fn csv_port_serves_configured_directory() {
        let dir = workspace();
        let config = cli::load_config(&dir.path().join("app.ini")).unwrap();
        let port = cli::open_data_port(&config).unwrap();
        let records = port.fetch_history("TCS.NS", HistoryRange::Max, "1d").unwrap();
        assert_eq!(records.len(), 120);
    }

    #[test]
    fn csv_port_requires_directory() {
        let file = write_temp_ini("[data]\nsource = csv\n");
        let adapter =
            strategist::adapters::file_config_adapter::FileConfigAdapter::from_file(file.path())
                .unwrap();
        assert!(matches!(
            cli::open_data_port(&adapter),
            Err(StrategistError::ConfigMissing { .. })
        ));
    }
}

mod commands {
    use super::*;

    #[test]
    fn backtest_writes_report_file() {
        let dir = workspace();
        let out = dir.path().join("report.json");
        let code = run(&[
            "backtest",
            "-c",
            &path_str(&dir.path().join("app.ini")),
            "-r",
            &path_str(&dir.path().join("request.json")),
            "-o",
            &path_str(&out),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(report["stockSymbol"], "TCS.NS");
        assert_eq!(report["equityCurve"].as_array().unwrap().len(), 120);
        let total = report["totalTrades"].as_u64().unwrap();
        assert_eq!(report["trades"].as_array().unwrap().len() as u64, total);
    }

    #[test]
    fn backtest_unknown_symbol_fails() {
        let dir = workspace();
        let request = dir.path().join("other.json");
        fs::write(&request, REQUEST.replace("TCS.NS", "WIPRO.NS")).unwrap();
        let code = run(&[
            "backtest",
            "-c",
            &path_str(&dir.path().join("app.ini")),
            "-r",
            &path_str(&request),
        ]);
        assert_ne!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn validate_accepts_good_request() {
        let dir = workspace();
        let code = run(&["validate", "-r", &path_str(&dir.path().join("request.json"))]);
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[test]
    fn validate_rejects_bad_operator() {
        let dir = workspace();
        let request = dir.path().join("bad.json");
        fs::write(&request, REQUEST.replace("crossesDown", "crossesSideways")).unwrap();
        let code = run(&["validate", "-r", &path_str(&request)]);
        assert_ne!(code, ExitCode::SUCCESS);
    }
}

#[cfg(feature = "sqlite")]
mod saved_strategies {
    use super::*;
    use strategist::adapters::sqlite_adapter::SqliteAdapter;
    use strategist::adapters::file_config_adapter::FileConfigAdapter;
    use strategist::ports::strategy_store_port::StrategyStore;

    const SAVED: &str = r#"{
        "entryRules": {"condition": "AND", "rules": [
            {"type": "rule", "rule": {"indicator": "CLOSE", "operator": "crossesUp",
                "compareIndicator": "EMA", "compareParams": [{"name": "period", "value": "8"}]}}
        ]},
        "exitRules": {"condition": "AND", "rules": [
            {"type": "rule", "rule": {"indicator": "CLOSE", "operator": "crossesDown",
                "compareIndicator": "EMA", "compareParams": [{"name": "period", "value": "8"}]}}
        ]}
    }"#;

    fn sqlite_workspace() -> TempDir {
        let dir = workspace();
        let ini = format!(
            "[data]\nsource = csv\ncsv_dir = {dir}\n\n[sqlite]\npath = {dir}/strategist.db\npool_size = 1\n\n[schedule]\nsymbol = TCS.NS\nrange = max\ninterval = 1d\n",
            dir = dir.path().display()
        );
        fs::write(dir.path().join("app.ini"), ini).unwrap();
        fs::write(dir.path().join("saved.json"), SAVED).unwrap();
        dir
    }

    fn store(dir: &TempDir) -> SqliteAdapter {
        let config = FileConfigAdapter::from_file(dir.path().join("app.ini")).unwrap();
        SqliteAdapter::from_config(&config).unwrap()
    }

    #[test]
    fn save_then_run_saved_records_a_run() {
        let dir = sqlite_workspace();
        let ini = path_str(&dir.path().join("app.ini"));

        let code = run(&[
            "strategy",
            "-c",
            &ini,
            "save",
            "--name",
            "ema cross",
            "-f",
            &path_str(&dir.path().join("saved.json")),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);

        let saved = store(&dir).list_strategies().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "ema cross");

        assert_eq!(run(&["run-saved", "-c", &ini]), ExitCode::SUCCESS);

        let runs = store(&dir).list_runs(&saved[0].id).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].symbol, "TCS.NS");
        assert_eq!(runs[0].range, "max");
    }

    #[test]
    fn save_rejects_uncompilable_rules() {
        let dir = sqlite_workspace();
        let bad = dir.path().join("bad.json");
        fs::write(&bad, SAVED.replace("EMA", "EMMA")).unwrap();
        let code = run(&[
            "strategy",
            "-c",
            &path_str(&dir.path().join("app.ini")),
            "save",
            "--name",
            "typo",
            "-f",
            &path_str(&bad),
        ]);
        assert_ne!(code, ExitCode::SUCCESS);
        assert!(store(&dir).list_strategies().unwrap().is_empty());
    }

    #[test]
    fn delete_unknown_strategy_fails() {
        let dir = sqlite_workspace();
        let code = run(&[
            "strategy",
            "-c",
            &path_str(&dir.path().join("app.ini")),
            "delete",
            "deadbeef",
        ]);
        assert_ne!(code, ExitCode::SUCCESS);
    }
}
