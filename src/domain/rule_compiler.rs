//! Compiles a rule tree into an index-addressable predicate.
//!
//! # Semantics
//!
//! - A comparison with an undefined operand (indicator still warming up) is `false`.
//! - `<=` / `>=` are built as `strict OR equal`, never as a native comparison.
//! - `=` / `==` is exact floating-point equality.
//! - `crossesUp(L, R)` at `i` holds when `L[i-1] <= R[i-1]` and `L[i] > R[i]`;
//!   `crossesDown` mirrors it. Both are `false` at index 0.
//! - Groups fold left to right with no precedence. Child `k >= 1` joins the
//!   running result with its own declared combinator if it has one, otherwise
//!   with the group's. A nested group is folded completely before it joins.
//! - An empty group is `false` everywhere.

use crate::domain::error::StrategistError;
use crate::domain::indicator::engine::IndicatorEngine;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::rule::{Combinator, CompareTarget, Comparison, RuleGroup, RuleNode};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Equal,
    CrossesUp,
    CrossesDown,
}

impl FromStr for Operator {
    type Err = StrategistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim() {
            "<" => Operator::Less,
            ">" => Operator::Greater,
            "<=" => Operator::LessOrEqual,
            ">=" => Operator::GreaterOrEqual,
            "=" | "==" => Operator::Equal,
            other if other.eq_ignore_ascii_case("crossesUp") => Operator::CrossesUp,
            other if other.eq_ignore_ascii_case("crossesDown") => Operator::CrossesDown,
            _ => {
                return Err(StrategistError::UnknownOperator {
                    operator: s.to_string(),
                });
            }
        };
        Ok(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::LessOrEqual => "<=",
            Operator::GreaterOrEqual => ">=",
            Operator::Equal => "=",
            Operator::CrossesUp => "crossesUp",
            Operator::CrossesDown => "crossesDown",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone)]
pub enum Operand {
    Series(Arc<IndicatorSeries>),
    Constant(f64),
}

impl Operand {
    pub fn value(&self, index: usize) -> Option<f64> {
        match self {
            Operand::Series(series) => series.value(index),
            Operand::Constant(c) => Some(*c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Less,
    Greater,
    Equal,
}

#[derive(Debug, Clone)]
pub enum Predicate {
    Never,
    Compare {
        left: Operand,
        relation: Relation,
        right: Operand,
    },
    CrossUp {
        left: Operand,
        right: Operand,
    },
    CrossDown {
        left: Operand,
        right: Operand,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn is_satisfied(&self, index: usize) -> bool {
        match self {
            Predicate::Never => false,
            Predicate::Compare {
                left,
                relation,
                right,
            } => match (left.value(index), right.value(index)) {
                (Some(l), Some(r)) => match relation {
                    Relation::Less => l < r,
                    Relation::Greater => l > r,
                    Relation::Equal => l == r,
                },
                _ => false,
            },
            Predicate::CrossUp { left, right } => {
                crossed(left, right, index, |prev_l, prev_r, l, r| {
                    prev_l <= prev_r && l > r
                })
            }
            Predicate::CrossDown { left, right } => {
                crossed(left, right, index, |prev_l, prev_r, l, r| {
                    prev_l >= prev_r && l < r
                })
            }
            Predicate::And(a, b) => a.is_satisfied(index) && b.is_satisfied(index),
            Predicate::Or(a, b) => a.is_satisfied(index) || b.is_satisfied(index),
        }
    }

    fn combine(self, combinator: Combinator, other: Predicate) -> Predicate {
        match combinator {
            Combinator::And => Predicate::And(Box::new(self), Box::new(other)),
            Combinator::Or => Predicate::Or(Box::new(self), Box::new(other)),
        }
    }
}

fn crossed(
    left: &Operand,
    right: &Operand,
    index: usize,
    test: impl Fn(f64, f64, f64, f64) -> bool,
) -> bool {
    if index == 0 {
        return false;
    }
    let values = (
        left.value(index - 1),
        right.value(index - 1),
        left.value(index),
        right.value(index),
    );
    match values {
        (Some(prev_l), Some(prev_r), Some(l), Some(r)) => test(prev_l, prev_r, l, r),
        _ => false,
    }
}

/// Folds a group's children into one predicate.
pub fn compile_group(
    group: &RuleGroup,
    engine: &mut IndicatorEngine<'_>,
) -> Result<Predicate, StrategistError> {
    let mut children = group.children.iter();
    let Some(first) = children.next() else {
        return Ok(Predicate::Never);
    };

    let mut running = compile_node(&first.node, engine)?;
    for child in children {
        let predicate = compile_node(&child.node, engine)?;
        let combinator = child.combinator.unwrap_or(group.combinator);
        running = running.combine(combinator, predicate);
    }
    Ok(running)
}

pub fn compile_node(
    node: &RuleNode,
    engine: &mut IndicatorEngine<'_>,
) -> Result<Predicate, StrategistError> {
    match node {
        RuleNode::Comparison(comparison) => compile_comparison(comparison, engine),
        RuleNode::Group(group) => compile_group(group, engine),
    }
}

pub fn compile_comparison(
    comparison: &Comparison,
    engine: &mut IndicatorEngine<'_>,
) -> Result<Predicate, StrategistError> {
    let left = Operand::Series(engine.resolve(&comparison.indicator)?);
    let right = match &comparison.target {
        CompareTarget::Value(raw) => Operand::Constant(parse_value(raw)?),
        CompareTarget::Indicator(spec) => Operand::Series(engine.resolve(spec)?),
    };
    let operator: Operator = comparison.operator.parse()?;
    Ok(build(operator, left, right))
}

fn parse_value(raw: &str) -> Result<f64, StrategistError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| StrategistError::InvalidRuleValue {
            value: raw.to_string(),
        })
}

fn build(operator: Operator, left: Operand, right: Operand) -> Predicate {
    let compare = |relation, left: &Operand, right: &Operand| Predicate::Compare {
        left: left.clone(),
        relation,
        right: right.clone(),
    };
    match operator {
        Operator::Less => compare(Relation::Less, &left, &right),
        Operator::Greater => compare(Relation::Greater, &left, &right),
        Operator::Equal => compare(Relation::Equal, &left, &right),
        Operator::LessOrEqual => Predicate::Or(
            Box::new(compare(Relation::Less, &left, &right)),
            Box::new(compare(Relation::Equal, &left, &right)),
        ),
        Operator::GreaterOrEqual => Predicate::Or(
            Box::new(compare(Relation::Greater, &left, &right)),
            Box::new(compare(Relation::Equal, &left, &right)),
        ),
        Operator::CrossesUp => Predicate::CrossUp { left, right },
        Operator::CrossesDown => Predicate::CrossDown { left, right },
    }
}
