use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::spec::rules::RuleValue;

/// Value captured for a single field during a fill session.
///
/// Untagged on the wire: JSON null, booleans, numbers, and strings map
/// directly, and `{ "file": name }` records a chosen file by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    File { file: String },
}

impl FieldValue {
    /// Truthiness check backing `isEmpty`, `isNotEmpty`, and `required`:
    /// null, `false`, `0`, and the empty string all count as empty.
    pub fn is_falsy(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Bool(flag) => !flag,
            FieldValue::Number(num) => *num == 0.0 || num.is_nan(),
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::File { .. } => false,
        }
    }

    /// Numeric coercion: null counts as 0, booleans as 0/1, text is parsed
    /// after trimming with the empty string counting as 0. Files never
    /// coerce.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Null => Some(0.0),
            FieldValue::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            FieldValue::Number(num) => Some(*num),
            FieldValue::Text(text) => text_number(text),
            FieldValue::File { .. } => None,
        }
    }

    /// String rendering used for comparisons, substring checks, and display.
    /// Files render as their `[File: name]` label.
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::Null => "null".to_string(),
            FieldValue::Bool(flag) => flag.to_string(),
            FieldValue::Number(num) => num.to_string(),
            FieldValue::Text(text) => text.clone(),
            FieldValue::File { file } => format!("[File: {file}]"),
        }
    }
}

impl From<RuleValue> for FieldValue {
    fn from(value: RuleValue) -> Self {
        match value {
            RuleValue::Bool(flag) => FieldValue::Bool(flag),
            RuleValue::Number(num) => FieldValue::Number(num),
            RuleValue::Text(text) => FieldValue::Text(text),
        }
    }
}

/// String rendering of a possibly-unset value. An unset field renders as
/// "undefined" and an explicit null as "null", which is what string-based
/// validation rules end up checking.
pub fn coerced_text(value: Option<&FieldValue>) -> String {
    value.map_or_else(|| "undefined".to_string(), FieldValue::display_text)
}

pub(crate) fn text_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok()
}

/// Field-id keyed bag of captured values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueBag {
    entries: BTreeMap<String, FieldValue>,
}

impl ValueBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_id: &str) -> Option<&FieldValue> {
        self.entries.get(field_id)
    }

    pub fn insert(&mut self, field_id: impl Into<String>, value: FieldValue) {
        self.entries.insert(field_id.into(), value);
    }

    pub fn remove(&mut self, field_id: &str) -> Option<FieldValue> {
        self.entries.remove(field_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.entries.iter()
    }
}

impl FromIterator<(String, FieldValue)> for ValueBag {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
