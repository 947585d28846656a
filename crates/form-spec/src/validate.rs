use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::message;
use crate::spec::field::Field;
use crate::spec::rules::{RuleValue, ValidationRule, ValidationRuleType};
use crate::spec::template::Template;
use crate::value::{FieldValue, ValueBag, coerced_text};
use crate::visibility::{VisibilitySet, resolve_visibility};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Checks a field's rules in order and returns the first failure message,
/// if any. Later rules are not evaluated once one fails.
pub fn validate_field(field: &Field, value: Option<&FieldValue>) -> Option<String> {
    field
        .validation_rules
        .iter()
        .find_map(|rule| check_rule(field, rule, value))
}

/// Validates every visible field. The returned map is keyed by internal
/// field id and empty exactly when the form can be submitted.
pub fn validate_visible(
    template: &Template,
    visibility: &VisibilitySet,
    values: &ValueBag,
) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();
    for field in visibility.ordered_fields(template) {
        if let Some(failure) = validate_field(field, values.get(&field.id)) {
            errors.insert(field.id.clone(), failure);
        }
    }
    errors
}

/// Convenience wrapper that resolves visibility first.
pub fn validate(template: &Template, values: &ValueBag) -> BTreeMap<String, String> {
    validate_visible(template, &resolve_visibility(template, values), values)
}

fn check_rule(field: &Field, rule: &ValidationRule, value: Option<&FieldValue>) -> Option<String> {
    match rule.kind {
        ValidationRuleType::Required => {
            if value.is_none_or(FieldValue::is_falsy) {
                return Some(message::render(field, rule, message::REQUIRED));
            }
        }
        ValidationRuleType::MinLength => {
            if let Some(limit) = rule_limit(rule)
                && (coerced_text(value).len() as f64) < limit
            {
                return Some(message::render(field, rule, message::MIN_LENGTH));
            }
        }
        ValidationRuleType::MaxLength => {
            if let Some(limit) = rule_limit(rule)
                && (coerced_text(value).len() as f64) > limit
            {
                return Some(message::render(field, rule, message::MAX_LENGTH));
            }
        }
        ValidationRuleType::Min => {
            if let Some(limit) = rule_limit(rule)
                && let Some(actual) = value.and_then(FieldValue::as_number)
                && actual < limit
            {
                return Some(message::render(field, rule, message::MIN));
            }
        }
        ValidationRuleType::Max => {
            if let Some(limit) = rule_limit(rule)
                && let Some(actual) = value.and_then(FieldValue::as_number)
                && actual > limit
            {
                return Some(message::render(field, rule, message::MAX));
            }
        }
        ValidationRuleType::Regex => {
            if let Some(pattern) = rule.value.as_ref().map(RuleValue::display_text) {
                match Regex::new(&pattern) {
                    Ok(regex) => {
                        if !regex.is_match(&coerced_text(value)) {
                            return Some(message::render(field, rule, message::INVALID_FORMAT));
                        }
                    }
                    // An unparseable pattern is an authoring mistake, not a
                    // value problem; the custom message does not apply.
                    Err(_) => return Some(message::INVALID_PATTERN.to_string()),
                }
            }
        }
        ValidationRuleType::Email => {
            if !EMAIL_PATTERN.is_match(&coerced_text(value)) {
                return Some(message::render(field, rule, message::INVALID_EMAIL));
            }
        }
        ValidationRuleType::Url => {
            if Url::parse(&coerced_text(value)).is_err() {
                return Some(message::render(field, rule, message::INVALID_URL));
            }
        }
        ValidationRuleType::Unknown => {}
    }
    None
}

/// Numeric limit of a rule; rules whose value is missing or does not
/// coerce are skipped.
fn rule_limit(rule: &ValidationRule) -> Option<f64> {
    let limit = rule.value.as_ref()?.as_number()?;
    (!limit.is_nan()).then_some(limit)
}
