//! Rule tree data structures.
//!
//! This module defines the declarative tree a strategy is written in:
//! - `IndicatorSpec`: an indicator name plus its raw string parameters
//! - `Comparison`: a leaf comparing an indicator against a constant or another indicator
//! - `RuleGroup`: an ordered list of children folded with AND/OR
//! - `RuleNode`: either of the above
//!
//! Everything here is still unvalidated text: names, operators and literal
//! values are checked by the compiler, not when the tree is built.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleParam {
    pub name: String,
    pub value: String,
}

impl RuleParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorSpec {
    pub name: String,
    pub params: Vec<RuleParam>,
}

impl IndicatorSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(RuleParam::new(name, value));
        self
    }

    /// First parameter whose name matches case-insensitively.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    /// Parses `AND`/`OR` case-insensitively; blank text means "not given".
    pub fn parse(raw: &str) -> Option<Combinator> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "AND" => Some(Combinator::And),
            "OR" => Some(Combinator::Or),
            _ => None,
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => f.write_str("AND"),
            Combinator::Or => f.write_str("OR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompareTarget {
    /// A literal that must parse as a number at compile time.
    Value(String),
    Indicator(IndicatorSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub indicator: IndicatorSpec,
    pub operator: String,
    pub target: CompareTarget,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleGroup {
    pub combinator: Combinator,
    pub children: Vec<RuleChild>,
}

/// A group member plus the combinator it declares for joining the running fold.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleChild {
    pub node: RuleNode,
    pub combinator: Option<Combinator>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuleNode {
    Comparison(Comparison),
    Group(RuleGroup),
}

impl RuleGroup {
    pub fn new(combinator: Combinator) -> Self {
        Self {
            combinator,
            children: Vec::new(),
        }
    }

    pub fn push(mut self, node: RuleNode) -> Self {
        self.children.push(RuleChild {
            node,
            combinator: None,
        });
        self
    }

    pub fn push_with(mut self, combinator: Combinator, node: RuleNode) -> Self {
        self.children.push(RuleChild {
            node,
            combinator: Some(combinator),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of comparison leaves in this group and all nested groups.
    pub fn leaf_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| match &c.node {
                RuleNode::Comparison(_) => 1,
                RuleNode::Group(g) => g.leaf_count(),
            })
            .sum()
    }
}

impl Comparison {
    pub fn against_value(
        indicator: IndicatorSpec,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            indicator,
            operator: operator.into(),
            target: CompareTarget::Value(value.into()),
        }
    }

    pub fn against_indicator(
        indicator: IndicatorSpec,
        operator: impl Into<String>,
        other: IndicatorSpec,
    ) -> Self {
        Self {
            indicator,
            operator: operator.into(),
            target: CompareTarget::Indicator(other),
        }
    }
}

impl From<Comparison> for RuleNode {
    fn from(comparison: Comparison) -> Self {
        RuleNode::Comparison(comparison)
    }
}

impl From<RuleGroup> for RuleNode {
    fn from(group: RuleGroup) -> Self {
        RuleNode::Group(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_above(value: &str) -> RuleNode {
        Comparison::against_value(IndicatorSpec::new("CLOSE"), ">", value).into()
    }

    #[test]
    fn param_lookup_is_case_insensitive_first_match() {
        let spec = IndicatorSpec::new("SMA")
            .with_param("Period", "10")
            .with_param("period", "30");
        assert_eq!(spec.param("PERIOD"), Some("10"));
        assert_eq!(spec.param("fast"), None);
    }

    #[test]
    fn combinator_parse() {
        assert_eq!(Combinator::parse("or"), Some(Combinator::Or));
        assert_eq!(Combinator::parse(" AND "), Some(Combinator::And));
        assert_eq!(Combinator::parse(""), None);
        assert_eq!(Combinator::parse("XOR"), None);
    }

    #[test]
    fn default_group_is_empty_and() {
        let group = RuleGroup::default();
        assert!(group.is_empty());
        assert_eq!(group.combinator, Combinator::And);
    }

    #[test]
    fn builder_records_overrides() {
        let group = RuleGroup::new(Combinator::Or)
            .push(close_above("1"))
            .push_with(Combinator::And, close_above("2"));
        assert_eq!(group.children[0].combinator, None);
        assert_eq!(group.children[1].combinator, Some(Combinator::And));
    }

    #[test]
    fn leaf_count_recurses() {
        let inner = RuleGroup::new(Combinator::Or)
            .push(close_above("1"))
            .push(close_above("2"));
        let outer = RuleGroup::new(Combinator::And)
            .push(close_above("3"))
            .push(inner.into());
        assert_eq!(outer.leaf_count(), 3);
    }
}
