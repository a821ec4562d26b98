//! A compiled entry/exit pair.

use crate::domain::error::StrategistError;
use crate::domain::indicator::engine::IndicatorEngine;
use crate::domain::rule::RuleGroup;
use crate::domain::rule_compiler::{compile_group, Predicate};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Strategy {
    pub entry: Predicate,
    pub exit: Predicate,
}

impl Strategy {
    /// Compiles both rule trees through one engine so their indicators share a cache.
    pub fn compile(
        entry: &RuleGroup,
        exit: &RuleGroup,
        engine: &mut IndicatorEngine<'_>,
    ) -> Result<Self, StrategistError> {
        let entry_predicate = compile_group(entry, engine)?;
        let exit_predicate = compile_group(exit, engine)?;
        debug!(
            entry_rules = entry.leaf_count(),
            exit_rules = exit.leaf_count(),
            indicators = engine.cached_count(),
            "compiled strategy"
        );
        Ok(Self {
            entry: entry_predicate,
            exit: exit_predicate,
        })
    }

    /// A strategy that never trades.
    pub fn idle() -> Self {
        Self {
            entry: Predicate::Never,
            exit: Predicate::Never,
        }
    }
}
