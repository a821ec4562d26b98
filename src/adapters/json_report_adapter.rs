//! Writes a backtest result as pretty-printed JSON.

use crate::domain::error::StrategistError;
use crate::domain::metrics::BacktestResult;
use crate::domain::rule_config::BacktestRequest;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs;

pub struct JsonReportAdapter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    stock_symbol: &'a str,
    range: &'a str,
    interval: &'a str,
    #[serde(flatten)]
    result: &'a BacktestResult,
}

impl JsonReportAdapter {
    pub fn render(
        result: &BacktestResult,
        request: &BacktestRequest,
    ) -> Result<String, StrategistError> {
        let report = Report {
            stock_symbol: &request.stock_symbol,
            range: &request.range,
            interval: &request.interval,
            result,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        request: &BacktestRequest,
        output_path: &str,
    ) -> Result<(), StrategistError> {
        let body = Self::render(result, request)?;
        fs::write(output_path, body)?;
        Ok(())
    }
}
