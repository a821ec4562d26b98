//! Domain error types.

/// Top-level error type for strategist.
#[derive(Debug, thiserror::Error)]
pub enum StrategistError {
    #[error("unknown indicator: {name}")]
    UnknownIndicator { name: String },

    #[error("unknown operator: {operator}")]
    UnknownOperator { operator: String },

    #[error("invalid rule value '{value}': expected a number")]
    InvalidRuleValue { value: String },

    #[error("invalid rule: {reason}")]
    RuleInvalid { reason: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("strategy not found: {id}")]
    StrategyNotFound { id: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StrategistError {
    /// True for errors raised while turning a rule tree into predicates.
    pub fn is_compilation_error(&self) -> bool {
        matches!(
            self,
            StrategistError::UnknownIndicator { .. }
                | StrategistError::UnknownOperator { .. }
                | StrategistError::InvalidRuleValue { .. }
                | StrategistError::RuleInvalid { .. }
        )
    }
}

impl From<&StrategistError> for std::process::ExitCode {
    fn from(err: &StrategistError) -> Self {
        let code: u8 = match err {
            StrategistError::Io(_) => 1,
            StrategistError::ConfigParse { .. }
            | StrategistError::ConfigMissing { .. }
            | StrategistError::ConfigInvalid { .. } => 2,
            StrategistError::Database { .. }
            | StrategistError::DatabaseQuery { .. }
            | StrategistError::StrategyNotFound { .. } => 3,
            StrategistError::UnknownIndicator { .. }
            | StrategistError::UnknownOperator { .. }
            | StrategistError::InvalidRuleValue { .. }
            | StrategistError::RuleInvalid { .. }
            | StrategistError::Json(_) => 4,
            StrategistError::NoData { .. } | StrategistError::InvalidRequest { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compilation_errors_are_flagged() {
        let err = StrategistError::UnknownIndicator {
            name: "FOO".into(),
        };
        assert!(err.is_compilation_error());
        assert!(
            StrategistError::UnknownOperator {
                operator: "~".into()
            }
            .is_compilation_error()
        );
        assert!(
            !StrategistError::NoData {
                symbol: "TCS.NS".into()
            }
            .is_compilation_error()
        );
    }

    #[test]
    fn messages_carry_the_raw_input() {
        let err = StrategistError::UnknownIndicator {
            name: "Bolinger".into(),
        };
        assert_eq!(err.to_string(), "unknown indicator: Bolinger");

        let err = StrategistError::InvalidRuleValue {
            value: "abc".into(),
        };
        assert!(err.to_string().contains("'abc'"));
    }
}
