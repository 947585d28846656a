use serde_json::{Map, Value, json};

use crate::schema::values_schema;
use crate::spec::field::{Field, FieldType};
use crate::spec::template::Template;
use crate::value::ValueBag;
use crate::visibility::{VisibilitySet, resolve_visibility};

/// Describes a single field for preview outputs.
#[derive(Debug, Clone)]
pub struct PreviewField {
    pub id: String,
    /// Key the field would use in submission output.
    pub key: String,
    pub label: String,
    pub kind: FieldType,
    /// Display flag as authored; enforcement runs through validation rules.
    pub required: bool,
    /// Whether visibility rules are attached to this field.
    pub conditional: bool,
    pub visible: bool,
    pub placeholder: Option<String>,
    pub options: Option<Vec<String>>,
    pub current_value: Option<Value>,
}

/// Describes a section and its fields for preview outputs.
#[derive(Debug, Clone)]
pub struct PreviewSection {
    pub id: String,
    pub name: String,
    pub collapsed: bool,
    pub visible: bool,
    pub fields: Vec<PreviewField>,
}

/// Collected payload used by both the text and JSON previews.
#[derive(Debug, Clone)]
pub struct PreviewPayload {
    pub form_id: String,
    pub form_name: String,
    pub description: Option<String>,
    pub visible_fields: usize,
    pub total_fields: usize,
    pub sections: Vec<PreviewSection>,
    /// JSON Schema for the value bag under the current visibility.
    pub schema: Value,
}

/// Build the preview payload from a template and the current value bag.
pub fn build_preview(template: &Template, values: &ValueBag) -> PreviewPayload {
    let visibility = resolve_visibility(template, values);

    let sections = template
        .sections
        .iter()
        .map(|section| PreviewSection {
            id: section.id.clone(),
            name: section.name.clone(),
            collapsed: section.collapsed,
            visible: visibility.section_visible(&section.id),
            fields: section
                .components
                .iter()
                .map(|field| preview_field(field, &visibility, values))
                .collect(),
        })
        .collect::<Vec<_>>();

    PreviewPayload {
        form_id: template.form_id.clone(),
        form_name: template.form_name.clone(),
        description: template.description.clone(),
        visible_fields: visibility.visible_field_count(),
        total_fields: template.fields().count(),
        schema: values_schema(template, &visibility),
        sections,
    }
}

fn preview_field(field: &Field, visibility: &VisibilitySet, values: &ValueBag) -> PreviewField {
    PreviewField {
        id: field.id.clone(),
        key: field.export_key().to_string(),
        label: field.label.clone(),
        kind: field.kind,
        required: field.required,
        conditional: !field.conditional_rules.is_empty(),
        visible: visibility.field_visible(&field.id),
        placeholder: field.placeholder.clone(),
        options: field.options.clone(),
        current_value: values
            .get(&field.id)
            .map(|value| serde_json::to_value(value).unwrap_or(Value::Null)),
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json(payload: &PreviewPayload) -> Value {
    let sections = payload
        .sections
        .iter()
        .map(|section| {
            json!({
                "id": section.id,
                "name": section.name,
                "collapsed": section.collapsed,
                "visible": section.visible,
                "fields": section
                    .fields
                    .iter()
                    .map(preview_field_json)
                    .collect::<Vec<_>>(),
            })
        })
        .collect::<Vec<_>>();

    json!({
        "formId": payload.form_id,
        "formName": payload.form_name,
        "description": payload.description,
        "progress": {
            "visible": payload.visible_fields,
            "total": payload.total_fields,
        },
        "sections": sections,
        "schema": payload.schema,
    })
}

fn preview_field_json(field: &PreviewField) -> Value {
    let mut map = Map::new();
    map.insert("id".into(), Value::String(field.id.clone()));
    map.insert("key".into(), Value::String(field.key.clone()));
    map.insert("label".into(), Value::String(field.label.clone()));
    map.insert("type".into(), Value::String(field.kind.as_str().to_string()));
    map.insert("required".into(), Value::Bool(field.required));
    map.insert("visible".into(), Value::Bool(field.visible));
    if field.conditional {
        map.insert("conditional".into(), Value::Bool(true));
    }
    if let Some(placeholder) = &field.placeholder {
        map.insert("placeholder".into(), Value::String(placeholder.clone()));
    }
    if let Some(options) = &field.options {
        map.insert(
            "options".into(),
            Value::Array(
                options
                    .iter()
                    .map(|option| Value::String(option.clone()))
                    .collect(),
            ),
        );
    }
    if let Some(value) = &field.current_value {
        map.insert("value".into(), value.clone());
    }
    Value::Object(map)
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &PreviewPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", payload.form_name, payload.form_id));
    if let Some(description) = &payload.description {
        lines.push(description.clone());
    }
    lines.push(format!(
        "Visible fields: {}/{}",
        payload.visible_fields, payload.total_fields
    ));

    for section in &payload.sections {
        if !section.visible {
            lines.push(format!("Section: {} [hidden]", section.name));
            continue;
        }
        lines.push(format!("Section: {}", section.name));
        let mut listed = false;
        for field in section.fields.iter().filter(|field| field.visible) {
            listed = true;
            let mut entry = format!(
                " - [{}] {} ({})",
                field.kind.as_str(),
                field.label,
                field.id
            );
            if field.required {
                entry.push_str(" [required]");
            }
            if field.conditional {
                entry.push_str(" [conditional]");
            }
            if let Some(value) = &field.current_value {
                entry.push_str(&format!(" = {}", value_to_display(value)));
            }
            lines.push(entry);
        }
        if !listed {
            lines.push("   No visible fields in this section".to_string());
        }
    }

    lines.join("\n")
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(num) => num.to_string(),
        Value::Object(map) => match map.get("file") {
            Some(Value::String(name)) => format!("[File: {name}]"),
            _ => Value::Object(map.clone()).to_string(),
        },
        other => other.to_string(),
    }
}
