use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::value::text_number;

/// Comparison applied by a conditional visibility rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
    /// Catch-all for operators this build does not know. Such rules always
    /// hold, so templates from a newer designer degrade to showing fields.
    #[serde(other)]
    Unknown,
}

impl ConditionOperator {
    /// Wire name of the operator, as used in template JSON and XML.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::NotEquals => "notEquals",
            ConditionOperator::Contains => "contains",
            ConditionOperator::GreaterThan => "greaterThan",
            ConditionOperator::LessThan => "lessThan",
            ConditionOperator::IsEmpty => "isEmpty",
            ConditionOperator::IsNotEmpty => "isNotEmpty",
            ConditionOperator::Unknown => "unknown",
        }
    }
}

/// Kind of check a validation rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ValidationRuleType {
    Required,
    MinLength,
    MaxLength,
    Min,
    Max,
    Regex,
    Email,
    Url,
    /// Catch-all for rule kinds this build does not know; such rules pass.
    #[serde(other)]
    Unknown,
}

impl ValidationRuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationRuleType::Required => "required",
            ValidationRuleType::MinLength => "minLength",
            ValidationRuleType::MaxLength => "maxLength",
            ValidationRuleType::Min => "min",
            ValidationRuleType::Max => "max",
            ValidationRuleType::Regex => "regex",
            ValidationRuleType::Email => "email",
            ValidationRuleType::Url => "url",
            ValidationRuleType::Unknown => "unknown",
        }
    }
}

/// Literal a rule compares against. Stored as a JSON string, number, or
/// boolean depending on how the rule was authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RuleValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RuleValue {
    /// Numeric coercion: booleans become 0/1, text is parsed after trimming
    /// with the empty string counting as 0.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RuleValue::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            RuleValue::Number(num) => Some(*num),
            RuleValue::Text(text) => text_number(text),
        }
    }

    /// String rendering used for comparisons and message placeholders.
    pub fn display_text(&self) -> String {
        match self {
            RuleValue::Bool(flag) => flag.to_string(),
            RuleValue::Number(num) => num.to_string(),
            RuleValue::Text(text) => text.clone(),
        }
    }
}

/// Single visibility condition. All rules attached to a field or section
/// must hold for it to be shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalRule {
    pub id: String,
    /// Internal id of the field whose current value the condition reads.
    pub field_id: String,
    pub operator: ConditionOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RuleValue>,
}

/// Single validation check on a field's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: ValidationRuleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RuleValue>,
    /// Author-supplied failure message; `{{value}}` and `{{label}}` are
    /// substituted when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
