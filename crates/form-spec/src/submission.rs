use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::export::escape_xml;
use crate::spec::template::Template;
use crate::value::{FieldValue, ValueBag};
use crate::visibility::VisibilitySet;

/// One visible field captured at submit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionField {
    /// External field id when the template defines one, internal id
    /// otherwise.
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
}

/// Validated form data, restricted to visible fields in template order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub form_id: String,
    pub form_name: String,
    pub fields: Vec<SubmissionField>,
}

/// Collects the visible fields' values in template order.
pub fn build_submission(
    template: &Template,
    visibility: &VisibilitySet,
    values: &ValueBag,
) -> Submission {
    let fields = visibility
        .ordered_fields(template)
        .into_iter()
        .map(|field| SubmissionField {
            key: field.export_key().to_string(),
            label: field.label.clone(),
            value: values.get(&field.id).cloned(),
        })
        .collect();
    Submission {
        form_id: template.form_id.clone(),
        form_name: template.form_name.clone(),
        fields,
    }
}

impl Submission {
    /// Flat JSON object keyed by field key. Files become their display
    /// label and untouched fields become null.
    pub fn to_json_value(&self) -> Value {
        let mut map = Map::new();
        for field in &self.fields {
            map.insert(field.key.clone(), field.export_value());
        }
        Value::Object(map)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_json_value())
    }

    /// CBOR encoding of the full submission, labels included.
    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }

    /// `<formSubmission>` document with one `<field>` element per row.
    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<formSubmission>\n");
        for field in &self.fields {
            out.push_str(&format!(
                "  <field id=\"{}\" label=\"{}\">\n",
                escape_xml(&field.key),
                escape_xml(&field.label)
            ));
            out.push_str(&format!("    <value>{}</value>\n", field.xml_value()));
            out.push_str("  </field>\n");
        }
        out.push_str("</formSubmission>");
        out
    }
}

impl SubmissionField {
    fn export_value(&self) -> Value {
        match &self.value {
            None | Some(FieldValue::Null) => Value::Null,
            Some(FieldValue::File { file }) => Value::String(format!("[File: {file}]")),
            Some(FieldValue::Bool(flag)) => Value::Bool(*flag),
            Some(FieldValue::Number(num)) => serde_json::Number::from_f64(*num)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Some(FieldValue::Text(text)) => Value::String(text.clone()),
        }
    }

    fn xml_value(&self) -> String {
        match &self.value {
            None | Some(FieldValue::Null) => String::new(),
            Some(value) => escape_xml(&value.display_text()),
        }
    }
}
