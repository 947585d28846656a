use std::collections::BTreeMap;

use thiserror::Error;

use crate::spec::template::Template;

/// Failure while loading or persisting templates.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access template storage: {0}")]
    Io(#[from] std::io::Error),
    #[error("template data is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Form id that cannot name a storage entry (empty or path-like).
    #[error("invalid form id {0:?}")]
    InvalidId(String),
}

/// Where templates live. Implementations upsert by form id.
pub trait TemplateStore {
    /// All templates, ordered by form id.
    fn load_all(&self) -> Result<Vec<Template>, StoreError>;

    fn get(&self, form_id: &str) -> Result<Option<Template>, StoreError>;

    fn save(&mut self, template: &Template) -> Result<(), StoreError>;

    /// Returns whether a template was actually removed.
    fn delete(&mut self, form_id: &str) -> Result<bool, StoreError>;
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: BTreeMap<String, Template>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load_all(&self) -> Result<Vec<Template>, StoreError> {
        Ok(self.templates.values().cloned().collect())
    }

    fn get(&self, form_id: &str) -> Result<Option<Template>, StoreError> {
        Ok(self.templates.get(form_id).cloned())
    }

    fn save(&mut self, template: &Template) -> Result<(), StoreError> {
        self.templates
            .insert(template.form_id.clone(), template.clone());
        Ok(())
    }

    fn delete(&mut self, form_id: &str) -> Result<bool, StoreError> {
        Ok(self.templates.remove(form_id).is_some())
    }
}
