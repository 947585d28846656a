#![allow(missing_docs)]

pub mod condition;
pub mod export;
pub mod message;
pub mod render;
pub mod schema;
pub mod session;
pub mod spec;
pub mod store;
pub mod submission;
pub mod validate;
pub mod value;
pub mod visibility;

pub use condition::{evaluate_rule, evaluate_rule_list};
pub use export::{template_json, template_xml, template_xsd};
pub use render::{PreviewField, PreviewPayload, PreviewSection, build_preview, render_json, render_text};
pub use schema::{template_schema, values_schema};
pub use session::{FillSession, SessionStatus, SubmitOutcome};
pub use spec::{
    ColumnType, ConditionOperator, ConditionalRule, Field, FieldType, RuleValue, Section,
    TableColumn, Template, ValidationRule, ValidationRuleType,
};
pub use store::{MemoryTemplateStore, StoreError, TemplateStore};
pub use submission::{Submission, SubmissionField, build_submission};
pub use validate::{validate, validate_field, validate_visible};
pub use value::{FieldValue, ValueBag, coerced_text};
pub use visibility::{VisibilitySet, resolve_visibility};
