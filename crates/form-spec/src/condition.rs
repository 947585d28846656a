use crate::spec::rules::{ConditionOperator, ConditionalRule, RuleValue};
use crate::value::{FieldValue, ValueBag};

/// Evaluates a single conditional rule against the current values.
///
/// Rules referencing a field with no value read it as unset. Operators this
/// build does not recognize evaluate to true.
pub fn evaluate_rule(rule: &ConditionalRule, values: &ValueBag) -> bool {
    let field_value = values.get(&rule.field_id);
    match rule.operator {
        ConditionOperator::Equals => rule
            .value
            .as_ref()
            .is_none_or(|expected| loosely_equal(field_value, expected)),
        ConditionOperator::NotEquals => rule
            .value
            .as_ref()
            .is_none_or(|expected| !loosely_equal(field_value, expected)),
        ConditionOperator::Contains => rule
            .value
            .as_ref()
            .is_none_or(|expected| contains(field_value, expected)),
        ConditionOperator::GreaterThan => {
            numeric_compare(field_value, rule.value.as_ref(), |actual, limit| {
                actual > limit
            })
        }
        ConditionOperator::LessThan => {
            numeric_compare(field_value, rule.value.as_ref(), |actual, limit| {
                actual < limit
            })
        }
        ConditionOperator::IsEmpty => field_value.is_none_or(FieldValue::is_falsy),
        ConditionOperator::IsNotEmpty => !field_value.is_none_or(FieldValue::is_falsy),
        ConditionOperator::Unknown => true,
    }
}

/// Every rule must hold; an empty list always holds.
pub fn evaluate_rule_list(rules: &[ConditionalRule], values: &ValueBag) -> bool {
    rules.iter().all(|rule| evaluate_rule(rule, values))
}

/// Loose equality: numeric comparison when both sides coerce to a non-NaN
/// number, comparison of the string renderings otherwise. An unset or null
/// field value never equals a rule literal.
fn loosely_equal(field_value: Option<&FieldValue>, expected: &RuleValue) -> bool {
    let value = match field_value {
        None | Some(FieldValue::Null) => return false,
        Some(value) => value,
    };
    if let (Some(actual), Some(literal)) = (value.as_number(), expected.as_number())
        && !actual.is_nan()
        && !literal.is_nan()
    {
        return actual == literal;
    }
    value.display_text() == expected.display_text()
}

/// Substring check on the string renderings. Falsy field values collapse to
/// the empty string first, so `0` does not contain "0".
fn contains(field_value: Option<&FieldValue>, expected: &RuleValue) -> bool {
    let haystack = match field_value {
        Some(value) if !value.is_falsy() => value.display_text(),
        _ => String::new(),
    };
    haystack.contains(&expected.display_text())
}

/// Numeric ordering; any side that fails to coerce (or coerces to NaN)
/// makes the rule false.
fn numeric_compare(
    field_value: Option<&FieldValue>,
    expected: Option<&RuleValue>,
    ordering: impl Fn(f64, f64) -> bool,
) -> bool {
    match (
        field_value.and_then(FieldValue::as_number),
        expected.and_then(RuleValue::as_number),
    ) {
        (Some(actual), Some(limit)) => ordering(actual, limit),
        _ => false,
    }
}
