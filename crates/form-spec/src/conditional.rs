use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current values of a form, keyed by field id.
pub type ValueMap = std::collections::BTreeMap<String, Value>;

/// Comparison applied to the source field's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

/// What a met condition does to the field or section that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConditionAction {
    Show,
    Hide,
    Enable,
    Disable,
    Require,
    Optional,
}

/// Single-source rule driving visibility, enablement, or requiredness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Conditional {
    pub source_field: String,
    pub operator: ConditionOperator,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    pub action: ConditionAction,
}

impl Conditional {
    /// Evaluates the comparison against the current value map.
    ///
    /// The source value is coerced to a string, with absent and null values
    /// coercing to the empty string. Numeric operators parse both sides as
    /// floats; either parse failure makes the condition false.
    pub fn is_met(&self, values: &ValueMap) -> bool {
        let current = values
            .get(&self.source_field)
            .map(coerce_to_string)
            .unwrap_or_default();
        match self.operator {
            ConditionOperator::Equals => current == self.value,
            ConditionOperator::NotEquals => current != self.value,
            ConditionOperator::Contains => {
                current.to_lowercase().contains(&self.value.to_lowercase())
            }
            ConditionOperator::NotContains => {
                !current.to_lowercase().contains(&self.value.to_lowercase())
            }
            ConditionOperator::GreaterThan => {
                match (current.parse::<f64>(), self.value.parse::<f64>()) {
                    (Ok(lhs), Ok(rhs)) => lhs > rhs,
                    _ => false,
                }
            }
            ConditionOperator::LessThan => {
                match (current.parse::<f64>(), self.value.parse::<f64>()) {
                    (Ok(lhs), Ok(rhs)) => lhs < rhs,
                    _ => false,
                }
            }
            ConditionOperator::IsEmpty => current.is_empty(),
            ConditionOperator::IsNotEmpty => !current.is_empty(),
        }
    }
}

/// String coercion shared by the evaluator and the validator.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(num) => num.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
