//! Report output port trait.

use crate::domain::error::StrategistError;
use crate::domain::metrics::BacktestResult;
use crate::domain::rule_config::BacktestRequest;

pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        request: &BacktestRequest,
        output_path: &str,
    ) -> Result<(), StrategistError>;
}
