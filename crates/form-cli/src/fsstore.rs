use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use form_spec::{StoreError, Template, TemplateStore};

/// Template store over a directory holding one `<formId>.json` file per
/// template. The directory is created lazily on first save; a missing
/// directory reads as an empty store.
pub struct DirTemplateStore {
    root: PathBuf,
}

impl DirTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn template_path(&self, form_id: &str) -> Result<PathBuf, StoreError> {
        // The form id doubles as the file name; keep it inside the root.
        if form_id.is_empty()
            || form_id == "."
            || form_id == ".."
            || form_id.contains(['/', '\\'])
        {
            return Err(StoreError::InvalidId(form_id.to_string()));
        }
        Ok(self.root.join(format!("{form_id}.json")))
    }
}

impl TemplateStore for DirTemplateStore {
    fn load_all(&self) -> Result<Vec<Template>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut templates: Vec<Template> = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_none_or(|extension| extension != "json") {
                continue;
            }
            let contents = fs::read_to_string(&path)?;
            templates.push(serde_json::from_str(&contents)?);
        }
        templates.sort_by(|a, b| a.form_id.cmp(&b.form_id));
        Ok(templates)
    }

    fn get(&self, form_id: &str) -> Result<Option<Template>, StoreError> {
        let path = self.template_path(form_id)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&mut self, template: &Template) -> Result<(), StoreError> {
        let path = self.template_path(&template.form_id)?;
        fs::create_dir_all(&self.root)?;
        let contents = serde_json::to_string_pretty(template)?;
        fs::write(path, format!("{contents}\n"))?;
        Ok(())
    }

    fn delete(&mut self, form_id: &str) -> Result<bool, StoreError> {
        let path = self.template_path(form_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
