use chrono::Utc;
use serde_json::json;

use form_spec::{
    Field, FieldType, FieldValue, FillSession, MemoryTemplateStore, RuleValue, Section,
    SessionStatus, SubmitOutcome, Template, TemplateStore, ValidationRule, ValidationRuleType,
    build_submission, resolve_visibility, template_json, template_schema, template_xml,
    template_xsd, values_schema,
};

fn fixture() -> Template {
    serde_json::from_str(include_str!("fixtures/onboarding.json")).expect("deserialize fixture")
}

fn text_field(id: &str, label: &str) -> Field {
    Field {
        id: id.into(),
        kind: FieldType::Text,
        label: label.into(),
        field_id: None,
        placeholder: None,
        required: false,
        options: None,
        default_value: None,
        validation_rules: vec![],
        conditional_rules: vec![],
        section_id: None,
        min: None,
        max: None,
        step: None,
        accept: None,
        columns: None,
        rows: None,
    }
}

fn single_section_template(components: Vec<Field>) -> Template {
    Template {
        form_id: "F9".into(),
        form_name: "Inline".into(),
        description: None,
        sections: vec![Section {
            id: "S1".into(),
            name: "Main".into(),
            collapsed: false,
            is_reusable: false,
            components,
            conditional_rules: vec![],
        }],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.into())
}

#[test]
fn new_session_seeds_only_nonempty_defaults() {
    let mut with_default = text_field("C1", "Country");
    with_default.default_value = Some(RuleValue::Text("NL".into()));
    let mut blank_default = text_field("C2", "City");
    blank_default.default_value = Some(RuleValue::Text("".into()));
    let mut toggled = text_field("C3", "Subscribed");
    toggled.kind = FieldType::Toggle;
    toggled.default_value = Some(RuleValue::Bool(true));

    let session = FillSession::new(single_section_template(vec![
        with_default,
        blank_default,
        toggled,
    ]));

    assert_eq!(session.values().get("C1"), Some(&text("NL")));
    assert_eq!(session.values().get("C2"), None);
    assert_eq!(session.values().get("C3"), Some(&FieldValue::Bool(true)));
    assert_eq!(session.status(), SessionStatus::Editing);
}

#[test]
fn failed_submit_records_errors_for_visible_fields_only() {
    let mut session = FillSession::new(fixture());

    let outcome = session.submit();
    let errors = match outcome {
        SubmitOutcome::Failed(errors) => errors,
        SubmitOutcome::Submitted(_) => panic!("expected a validation failure"),
    };
    // The business section is hidden while the default customer type is
    // "individual", so only the contact fields report errors.
    assert_eq!(errors.len(), 2);
    assert_eq!(
        errors.get("C1").map(String::as_str),
        Some("This field is required")
    );
    assert!(errors.contains_key("C2"));
    assert_eq!(session.status(), SessionStatus::Failed);
    assert_eq!(session.errors().len(), 2);
}

#[test]
fn set_value_clears_the_stale_error_without_revalidating() {
    let mut session = FillSession::new(fixture());
    session.submit();
    assert!(session.errors().contains_key("C1"));

    // Even an invalid replacement clears the error until the next submit.
    session.set_value("C1", text(""));
    assert!(!session.errors().contains_key("C1"));
    assert!(session.errors().contains_key("C2"));
    assert_eq!(session.status(), SessionStatus::Editing);
}

#[test]
fn successful_submit_projects_visible_fields_in_order() {
    let mut session = FillSession::new(fixture());
    session.set_value("C1", text("Jane Doe"));
    session.set_value("C2", text("jane@acme.io"));

    let submission = match session.submit() {
        SubmitOutcome::Submitted(submission) => submission,
        SubmitOutcome::Failed(errors) => panic!("unexpected errors: {errors:?}"),
    };
    assert_eq!(session.status(), SessionStatus::Submitted);
    assert!(session.errors().is_empty());

    let keys: Vec<&str> = submission
        .fields
        .iter()
        .map(|field| field.key.as_str())
        .collect();
    assert_eq!(keys, ["fullName", "workEmail", "customerType"]);
    assert_eq!(submission.form_id, "F1700000000001");

    let flat = submission.to_json_value();
    assert_eq!(flat["fullName"], json!("Jane Doe"));
    assert_eq!(flat["customerType"], json!("individual"));
}

#[test]
fn submit_includes_business_section_once_visible() {
    let mut session = FillSession::new(fixture());
    session.set_value("C1", text("Jane Doe"));
    session.set_value("C2", text("jane@acme.io"));
    session.set_value("C3", text("business"));

    // Company name is now visible, required, and empty.
    let errors = match session.submit() {
        SubmitOutcome::Failed(errors) => errors,
        SubmitOutcome::Submitted(_) => panic!("expected a validation failure"),
    };
    assert_eq!(errors.keys().collect::<Vec<_>>(), ["C4"]);

    session.set_value("C4", text("Acme B.V."));
    session.set_value("C5", FieldValue::Number(12.0));
    let submission = match session.submit() {
        SubmitOutcome::Submitted(submission) => submission,
        SubmitOutcome::Failed(errors) => panic!("unexpected errors: {errors:?}"),
    };
    let keys: Vec<&str> = submission
        .fields
        .iter()
        .map(|field| field.key.as_str())
        .collect();
    assert_eq!(
        keys,
        ["fullName", "workEmail", "customerType", "companyName", "employeeCount"]
    );
}

#[test]
fn reset_clears_values_and_errors_but_not_collapse_state() {
    let mut session = FillSession::new(fixture());
    session.set_value("C1", text("Jane"));
    session.toggle_section("S1");
    session.submit();

    session.reset();
    assert!(session.values().is_empty());
    assert!(session.errors().is_empty());
    assert_eq!(session.status(), SessionStatus::Editing);
    // Collapse state survives a reset; defaults are not re-seeded.
    assert!(session.is_collapsed("S1"));
    assert_eq!(session.values().get("C3"), None);
}

#[test]
fn toggle_section_flips_collapse_state() {
    let mut session = FillSession::new(fixture());
    assert!(!session.is_collapsed("S1"));
    session.toggle_section("S1");
    assert!(session.is_collapsed("S1"));
    session.toggle_section("S1");
    assert!(!session.is_collapsed("S1"));
}

#[test]
fn submission_renders_files_and_unset_values() {
    let mut attachment = text_field("C1", "CV");
    attachment.kind = FieldType::File;
    attachment.field_id = Some("cv".into());
    let untouched = text_field("C2", "Optional note");

    let form = single_section_template(vec![attachment, untouched]);
    let mut values = form_spec::ValueBag::new();
    values.insert("C1", FieldValue::File { file: "cv.pdf".into() });
    let visibility = resolve_visibility(&form, &values);
    let submission = build_submission(&form, &visibility, &values);

    let flat = submission.to_json_value();
    assert_eq!(flat["cv"], json!("[File: cv.pdf]"));
    assert_eq!(flat["C2"], json!(null));

    let pretty = submission.to_json_pretty().expect("render json");
    assert!(pretty.contains("[File: cv.pdf]"));
}

#[test]
fn submission_xml_escapes_markup() {
    let mut question = text_field("C1", "Q&A topic");
    question.field_id = Some("topic".into());
    let form = single_section_template(vec![question]);
    let mut values = form_spec::ValueBag::new();
    values.insert("C1", text("a<b"));
    let visibility = resolve_visibility(&form, &values);
    let submission = build_submission(&form, &visibility, &values);

    let xml = submission.to_xml();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("label=\"Q&amp;A topic\""));
    assert!(xml.contains("<value>a&lt;b</value>"));
}

#[test]
fn submission_cbor_round_trips() {
    let form = fixture();
    let mut values = form_spec::ValueBag::new();
    values.insert("C1", text("Jane Doe"));
    let visibility = resolve_visibility(&form, &values);
    let submission = build_submission(&form, &visibility, &values);

    let bytes = submission.to_cbor().expect("encode cbor");
    let decoded: form_spec::Submission = serde_cbor::from_slice(&bytes).expect("decode cbor");
    assert_eq!(submission, decoded);
}

#[test]
fn memory_store_upserts_by_form_id() {
    let mut store = MemoryTemplateStore::new();
    let mut form = fixture();
    store.save(&form).expect("save");

    form.form_name = "Customer Onboarding v2".into();
    store.save(&form).expect("save again");

    let all = store.load_all().expect("load");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].form_name, "Customer Onboarding v2");

    let loaded = store.get("F1700000000001").expect("get");
    assert_eq!(loaded.map(|template| template.form_name).as_deref(), Some("Customer Onboarding v2"));

    assert!(store.delete("F1700000000001").expect("delete"));
    assert!(!store.delete("F1700000000001").expect("delete again"));
    assert!(store.load_all().expect("load").is_empty());
}

#[test]
fn values_schema_requires_only_visible_required_fields() {
    let form = fixture();
    let visibility = resolve_visibility(&form, &form_spec::ValueBag::new());
    let schema = values_schema(&form, &visibility);

    let required = schema["required"].as_array().expect("required array");
    let required: Vec<&str> = required.iter().filter_map(|v| v.as_str()).collect();
    assert!(required.contains(&"C1"));
    assert!(required.contains(&"C2"));
    // Hidden section, so the company name is not required right now.
    assert!(!required.contains(&"C4"));

    let props = schema["properties"].as_object().expect("properties");
    assert_eq!(props["C5"]["type"], json!("number"));
    assert_eq!(props["C5"]["minimum"], json!(1.0));
    assert_eq!(props["C3"]["enum"], json!(["individual", "business"]));
    assert_eq!(props["C2"]["format"], json!("email"));
}

#[test]
fn template_schema_describes_the_model() {
    let schema = template_schema();
    assert_eq!(schema["title"], json!("Template"));
    assert!(schema["properties"].get("formId").is_some());
}

#[test]
fn template_exports_cover_json_xml_and_xsd() {
    let form = fixture();

    let rendered = template_json(&form).expect("render json");
    let reparsed: Template = serde_json::from_str(&rendered).expect("reparse");
    assert_eq!(form, reparsed);

    let xml = template_xml(&form);
    assert!(xml.contains("<form id=\"F1700000000001\" name=\"Customer Onboarding\">"));
    assert!(xml.contains("<createdAt>2024-11-02T09:15:00.000Z</createdAt>"));
    assert!(xml.contains("<component id=\"C3\" type=\"dropdown\">"));
    assert!(xml.contains("<rule id=\"R1\" fieldId=\"C3\" operator=\"equals\">"));
    assert!(xml.contains("<value>business</value>"));
    assert!(xml.contains("<rule type=\"minLength\">"));

    let xsd = template_xsd();
    assert!(xsd.contains("ComponentTypeEnum"));
    assert!(xsd.contains("<xs:attribute name=\"fieldId\" type=\"xs:string\" use=\"required\"/>"));
}
