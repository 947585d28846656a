use std::collections::{BTreeMap, BTreeSet};

use crate::spec::template::Template;
use crate::submission::{Submission, build_submission};
use crate::validate::validate_visible;
use crate::value::{FieldValue, ValueBag};
use crate::visibility::{VisibilitySet, resolve_visibility};

/// Lifecycle of a fill session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Values are being edited; nothing has been submitted yet, or an edit
    /// has invalidated the last submit attempt.
    Editing,
    /// The last submit attempt passed validation and produced a submission.
    Submitted,
    /// The last submit attempt failed validation.
    Failed,
}

/// Result of a submit attempt.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Submitted(Submission),
    /// Full error map, keyed by internal field id.
    Failed(BTreeMap<String, String>),
}

/// One pass over a template: captured values, validation errors, and
/// section collapse state. "No template selected" is the absence of a
/// session.
#[derive(Debug, Clone)]
pub struct FillSession {
    template: Template,
    values: ValueBag,
    errors: BTreeMap<String, String>,
    collapsed: BTreeSet<String>,
    status: SessionStatus,
}

impl FillSession {
    /// Starts a session over `template`, seeding every field that declares
    /// a non-empty default.
    pub fn new(template: Template) -> Self {
        let mut values = ValueBag::new();
        for field in template.fields() {
            if let Some(value) = field.seed_default() {
                values.insert(field.id.clone(), value);
            }
        }
        Self {
            template,
            values,
            errors: BTreeMap::new(),
            collapsed: BTreeSet::new(),
            status: SessionStatus::Editing,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn values(&self) -> &ValueBag {
        &self.values
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Stores a value and eagerly clears any stale error for that field.
    /// No re-validation happens until the next submit.
    pub fn set_value(&mut self, field_id: &str, value: FieldValue) {
        self.values.insert(field_id.to_string(), value);
        self.errors.remove(field_id);
        self.status = SessionStatus::Editing;
    }

    pub fn toggle_section(&mut self, section_id: &str) {
        if !self.collapsed.remove(section_id) {
            self.collapsed.insert(section_id.to_string());
        }
    }

    pub fn is_collapsed(&self, section_id: &str) -> bool {
        self.collapsed.contains(section_id)
    }

    /// Current visibility, recomputed from the live values.
    pub fn visibility(&self) -> VisibilitySet {
        resolve_visibility(&self.template, &self.values)
    }

    /// Validates the visible fields and either produces a submission or
    /// records the full error map. The session stays editable either way.
    pub fn submit(&mut self) -> SubmitOutcome {
        let visibility = self.visibility();
        let errors = validate_visible(&self.template, &visibility, &self.values);
        if errors.is_empty() {
            self.errors.clear();
            self.status = SessionStatus::Submitted;
            SubmitOutcome::Submitted(build_submission(&self.template, &visibility, &self.values))
        } else {
            self.errors = errors.clone();
            self.status = SessionStatus::Failed;
            SubmitOutcome::Failed(errors)
        }
    }

    /// Clears values and errors. Defaults are not re-seeded and collapse
    /// state is left alone.
    pub fn reset(&mut self) {
        self.values.clear();
        self.errors.clear();
        self.status = SessionStatus::Editing;
    }
}
