use std::collections::BTreeSet;

use crate::condition::evaluate_rule_list;
use crate::spec::field::Field;
use crate::spec::template::Template;
use crate::value::ValueBag;

/// Which sections and fields are currently shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilitySet {
    sections: BTreeSet<String>,
    fields: BTreeSet<String>,
}

impl VisibilitySet {
    pub fn section_visible(&self, section_id: &str) -> bool {
        self.sections.contains(section_id)
    }

    pub fn field_visible(&self, field_id: &str) -> bool {
        self.fields.contains(field_id)
    }

    pub fn visible_section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn visible_field_count(&self) -> usize {
        self.fields.len()
    }

    /// Visible fields in template order.
    pub fn ordered_fields<'a>(&self, template: &'a Template) -> Vec<&'a Field> {
        template
            .sections
            .iter()
            .filter(|section| self.section_visible(&section.id))
            .flat_map(|section| section.components.iter())
            .filter(|field| self.field_visible(&field.id))
            .collect()
    }
}

/// Recomputes visibility for the whole template from scratch.
///
/// A section whose rules fail hides every field in it regardless of the
/// fields' own rules. Values of hidden fields stay in `values` and still
/// feed other rules.
pub fn resolve_visibility(template: &Template, values: &ValueBag) -> VisibilitySet {
    let mut set = VisibilitySet::default();
    for section in &template.sections {
        if !evaluate_rule_list(&section.conditional_rules, values) {
            continue;
        }
        set.sections.insert(section.id.clone());
        for field in &section.components {
            if evaluate_rule_list(&field.conditional_rules, values) {
                set.fields.insert(field.id.clone());
            }
        }
    }
    set
}
