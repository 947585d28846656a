use std::sync::LazyLock;

use handlebars::Handlebars;
use serde_json::json;

use crate::spec::field::Field;
use crate::spec::rules::{RuleValue, ValidationRule};

pub const REQUIRED: &str = "This field is required";
pub const MIN_LENGTH: &str = "Minimum length is {{value}}";
pub const MAX_LENGTH: &str = "Maximum length is {{value}}";
pub const MIN: &str = "Minimum value is {{value}}";
pub const MAX: &str = "Maximum value is {{value}}";
pub const INVALID_FORMAT: &str = "Invalid format";
pub const INVALID_PATTERN: &str = "Invalid pattern";
pub const INVALID_EMAIL: &str = "Invalid email address";
pub const INVALID_URL: &str = "Invalid URL";

// Messages are plain terminal/report text, so HTML escaping is off.
static REGISTRY: LazyLock<Handlebars<'static>> = LazyLock::new(|| {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);
    registry
});

/// Renders the failure message for a rule, preferring the author-supplied
/// message over `fallback`. `{{value}}` is the rule's literal and
/// `{{label}}` the field's label; a message that fails to render is
/// returned verbatim.
pub fn render(field: &Field, rule: &ValidationRule, fallback: &str) -> String {
    let source = rule.message.as_deref().unwrap_or(fallback);
    let data = json!({
        "value": rule
            .value
            .as_ref()
            .map(RuleValue::display_text)
            .unwrap_or_default(),
        "label": field.label,
    });
    REGISTRY
        .render_template(source, &data)
        .unwrap_or_else(|_| source.to_string())
}
