use serde_json::{Map, Value, json};

use crate::spec::field::{Field, FieldType};
use crate::spec::template::Template;
use crate::visibility::VisibilitySet;

/// JSON Schema (draft-07) for the value bag a template accepts.
///
/// Properties cover every field; `required` lists only fields that are
/// currently visible and carry a `required` rule, so the schema tracks the
/// live form state.
pub fn values_schema(template: &Template, visibility: &VisibilitySet) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in template.fields() {
        properties.insert(field.id.clone(), field_schema(field));
        if visibility.field_visible(&field.id) && field.has_required_rule() {
            required.push(Value::String(field.id.clone()));
        }
    }
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn field_schema(field: &Field) -> Value {
    let mut schema = Map::new();
    schema.insert("title".into(), Value::String(field.label.clone()));
    match field.kind {
        FieldType::Number | FieldType::Slider => {
            schema.insert("type".into(), Value::String("number".into()));
            if let Some(min) = field.min {
                schema.insert("minimum".into(), json!(min));
            }
            if let Some(max) = field.max {
                schema.insert("maximum".into(), json!(max));
            }
        }
        FieldType::Checkbox | FieldType::Toggle => {
            schema.insert("type".into(), Value::String("boolean".into()));
        }
        FieldType::File => {
            schema.insert("type".into(), Value::String("object".into()));
            schema.insert("properties".into(), json!({ "file": { "type": "string" } }));
        }
        FieldType::Email => {
            schema.insert("type".into(), Value::String("string".into()));
            schema.insert("format".into(), Value::String("email".into()));
        }
        FieldType::Date => {
            schema.insert("type".into(), Value::String("string".into()));
            schema.insert("format".into(), Value::String("date".into()));
        }
        FieldType::Radio | FieldType::Dropdown => {
            schema.insert("type".into(), Value::String("string".into()));
            if let Some(options) = &field.options {
                schema.insert("enum".into(), json!(options));
            }
        }
        _ => {
            schema.insert("type".into(), Value::String("string".into()));
        }
    }
    Value::Object(schema)
}

/// Schema of the template model itself, for validating template JSON files
/// produced by other tools.
pub fn template_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(Template)).unwrap_or(Value::Null)
}
