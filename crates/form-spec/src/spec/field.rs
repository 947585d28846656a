use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::rules::{ConditionalRule, RuleValue, ValidationRule, ValidationRuleType};
use crate::value::FieldValue;

/// Widget kind of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Text,
    Number,
    Email,
    Textarea,
    Radio,
    Checkbox,
    Date,
    Dropdown,
    File,
    Toggle,
    Slider,
    Section,
    Table,
}

impl FieldType {
    /// Wire name of the field type, as used in template JSON and XML.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Textarea => "textarea",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
            FieldType::Dropdown => "dropdown",
            FieldType::File => "file",
            FieldType::Toggle => "toggle",
            FieldType::Slider => "slider",
            FieldType::Section => "section",
            FieldType::Table => "table",
        }
    }
}

/// Column kind of a table field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    Text,
    Number,
    Dropdown,
    Checkbox,
}

/// Column definition of a table field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Single field of a form template.
///
/// Designer-only attributes (placeholder, step, accept, table layout) are
/// carried so templates round-trip through the store unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Internal id, unique within the template; keys the value bag and the
    /// error map.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    /// Optional external id that keys submission output instead of `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Presentation flag only; enforcement happens through a `required`
    /// validation rule.
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<RuleValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_rules: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditional_rules: Vec<ConditionalRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<TableColumn>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

impl Field {
    /// Key under which this field appears in submission output.
    pub fn export_key(&self) -> &str {
        self.field_id.as_deref().unwrap_or(&self.id)
    }

    /// Default value a fresh fill session seeds; empty-string defaults are
    /// treated as no default.
    pub fn seed_default(&self) -> Option<FieldValue> {
        match &self.default_value {
            Some(RuleValue::Text(text)) if text.is_empty() => None,
            Some(value) => Some(FieldValue::from(value.clone())),
            None => None,
        }
    }

    pub fn has_required_rule(&self) -> bool {
        self.validation_rules
            .iter()
            .any(|rule| rule.kind == ValidationRuleType::Required)
    }
}
