//! JSON shapes of rule trees and backtest requests.
//!
//! Two forms arrive from outside:
//! - the request form (`RulesConfig` / `RuleConfig`), where a node is a group
//!   when it carries a non-empty `rules` list and a comparison otherwise;
//! - the saved-strategy form (`SavedRuleNode`), where a node declares
//!   `type: "group" | "rule"` and a comparison sits under `rule`.
//!
//! Both convert into [`RuleGroup`]. Scalars are accepted as strings or bare
//! numbers, since editors send either.

use crate::domain::error::StrategistError;
use crate::domain::rule::{
    Combinator, CompareTarget, Comparison, IndicatorSpec, RuleChild, RuleGroup, RuleNode,
    RuleParam,
};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamConfig {
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleConfig>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<ParamConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_params: Option<Vec<ParamConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleConfig>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    pub stock_symbol: String,
    pub range: String,
    pub interval: String,
    #[serde(default)]
    pub entry: Option<RulesConfig>,
    #[serde(default)]
    pub exit: Option<RulesConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedStrategy {
    #[serde(default)]
    pub entry_rules: Option<SavedRuleGroup>,
    #[serde(default)]
    pub exit_rules: Option<SavedRuleGroup>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SavedRuleGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<SavedRuleNode>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SavedRuleNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<SavedRuleNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleConfig>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(String::from)
}

fn optional_scalar_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

fn to_params(params: &Option<Vec<ParamConfig>>) -> Vec<RuleParam> {
    params
        .iter()
        .flatten()
        .map(|p| RuleParam::new(p.name.clone(), p.value.clone()))
        .collect()
}

fn non_blank(text: &Option<String>) -> Option<&str> {
    text.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn combinator_of(condition: &Option<String>) -> Option<Combinator> {
    condition.as_deref().and_then(Combinator::parse)
}

impl RulesConfig {
    /// Converts to the rule tree; a missing config is an empty group.
    pub fn to_group(config: Option<&RulesConfig>) -> Result<RuleGroup, StrategistError> {
        match config {
            Some(c) => RuleGroup::try_from(c),
            None => Ok(RuleGroup::default()),
        }
    }
}

impl TryFrom<&RulesConfig> for RuleGroup {
    type Error = StrategistError;

    fn try_from(config: &RulesConfig) -> Result<Self, Self::Error> {
        build_group(&config.condition, config.rules.as_deref().unwrap_or_default())
    }
}

fn build_group(condition: &Option<String>, rules: &[RuleConfig]) -> Result<RuleGroup, StrategistError> {
    let children = rules
        .iter()
        .map(RuleChild::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RuleGroup {
        combinator: combinator_of(condition).unwrap_or_default(),
        children,
    })
}

impl RuleConfig {
    pub fn is_group(&self) -> bool {
        self.rules.as_ref().is_some_and(|r| !r.is_empty())
    }
}

impl TryFrom<&RuleConfig> for RuleChild {
    type Error = StrategistError;

    fn try_from(config: &RuleConfig) -> Result<Self, Self::Error> {
        if config.is_group() {
            // The group's own condition folds its children; it does not
            // change how the group joins its parent.
            let group = build_group(&config.condition, config.rules.as_deref().unwrap_or_default())?;
            return Ok(RuleChild {
                node: RuleNode::Group(group),
                combinator: None,
            });
        }

        let comparison = Comparison::try_from(config)?;
        Ok(RuleChild {
            node: RuleNode::Comparison(comparison),
            combinator: combinator_of(&config.condition),
        })
    }
}

impl TryFrom<&RuleConfig> for Comparison {
    type Error = StrategistError;

    fn try_from(config: &RuleConfig) -> Result<Self, Self::Error> {
        let name = non_blank(&config.indicator).ok_or_else(|| StrategistError::RuleInvalid {
            reason: "rule has neither an indicator nor nested rules".to_string(),
        })?;
        let indicator = IndicatorSpec {
            name: name.to_string(),
            params: to_params(&config.params),
        };
        let operator = config.operator.clone().unwrap_or_default();

        let compare_type = match non_blank(&config.compare_type) {
            Some(t) => t.to_ascii_lowercase(),
            None if non_blank(&config.compare_indicator).is_some() => "indicator".to_string(),
            None => "value".to_string(),
        };

        let target = match compare_type.as_str() {
            "value" => CompareTarget::Value(config.value.clone().unwrap_or_default()),
            "indicator" => {
                let other = non_blank(&config.compare_indicator).ok_or_else(|| {
                    StrategistError::RuleInvalid {
                        reason: format!("{name}: indicator comparison without compareIndicator"),
                    }
                })?;
                CompareTarget::Indicator(IndicatorSpec {
                    name: other.to_string(),
                    params: to_params(&config.compare_params),
                })
            }
            other => {
                return Err(StrategistError::RuleInvalid {
                    reason: format!("unknown compareType '{other}'"),
                });
            }
        };

        Ok(Comparison {
            indicator,
            operator,
            target,
        })
    }
}

impl From<&SavedRuleGroup> for RulesConfig {
    fn from(group: &SavedRuleGroup) -> Self {
        RulesConfig {
            condition: group.condition.clone(),
            rules: group
                .rules
                .as_ref()
                .map(|nodes| nodes.iter().map(RuleConfig::from).collect()),
        }
    }
}

impl From<&SavedRuleNode> for RuleConfig {
    fn from(node: &SavedRuleNode) -> Self {
        if node.node_type.as_deref() == Some("group") {
            return RuleConfig {
                condition: node.condition.clone(),
                rules: node
                    .rules
                    .as_ref()
                    .map(|nodes| nodes.iter().map(RuleConfig::from).collect()),
                ..RuleConfig::default()
            };
        }

        let body = node.rule.clone().unwrap_or_default();
        RuleConfig {
            condition: node.condition.clone(),
            rules: None,
            ..body
        }
    }
}

impl SavedStrategy {
    pub fn from_json(json: &str) -> Result<Self, StrategistError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn entry_config(&self) -> Option<RulesConfig> {
        self.entry_rules.as_ref().map(RulesConfig::from)
    }

    pub fn exit_config(&self) -> Option<RulesConfig> {
        self.exit_rules.as_ref().map(RulesConfig::from)
    }
}

impl BacktestRequest {
    pub fn from_json(json: &str) -> Result<Self, StrategistError> {
        Ok(serde_json::from_str(json)?)
    }
}
