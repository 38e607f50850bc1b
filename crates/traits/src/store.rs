//! TemplateStore trait for abstracting where templates live.
//!
//! Renderers only ever ask a store for bytes by name, so the same pipeline runs
//! against a directory on disk or a pre-populated in-memory map.

use crate::template::validate_name;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use thiserror::Error;

/// Error type for template storage operations.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid template name: '{0}'")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// Shared template bytes (reference-counted).
pub type SharedTemplateData = Arc<Vec<u8>>;

/// Listing entry for a stored template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    pub name: String,
    pub size: u64,
    pub modified_at: Option<SystemTime>,
}

/// A named collection of template files.
///
/// Names are flat file names such as `service.docx`; see [`validate_name`].
pub trait TemplateStore: Send + Sync + Debug {
    /// Loads a template's bytes.
    fn load(&self, name: &str) -> Result<SharedTemplateData, StoreError>;

    /// Stores a template, replacing any existing one with the same name.
    fn save(&self, name: &str, data: Vec<u8>) -> Result<(), StoreError>;

    /// Deletes a template. Returns `false` if it did not exist.
    fn delete(&self, name: &str) -> Result<bool, StoreError>;

    /// Lists stored templates sorted by name.
    fn list(&self) -> Result<Vec<TemplateInfo>, StoreError>;

    fn exists(&self, name: &str) -> bool {
        self.load(name).is_ok()
    }

    /// Returns a human-readable name for this store (for logging).
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
struct StoredTemplate {
    data: SharedTemplateData,
    modified_at: SystemTime,
}

/// An in-memory template store.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: RwLock<BTreeMap<String, StoredTemplate>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert for setting up fixtures.
    pub fn with(self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Result<Self, StoreError> {
        self.save(&name.into(), data.into())?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.templates.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Returns `true` if the lock is poisoned (safe default).
    pub fn is_empty(&self) -> bool {
        self.templates.read().map(|t| t.is_empty()).unwrap_or(true)
    }
}

fn poisoned() -> StoreError {
    StoreError::Io("template store lock poisoned".to_string())
}

impl TemplateStore for InMemoryTemplateStore {
    fn load(&self, name: &str) -> Result<SharedTemplateData, StoreError> {
        let templates = self.templates.read().map_err(|_| poisoned())?;
        templates
            .get(name)
            .map(|t| t.data.clone())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn save(&self, name: &str, data: Vec<u8>) -> Result<(), StoreError> {
        validate_name(name)?;
        let mut templates = self.templates.write().map_err(|_| poisoned())?;
        templates.insert(
            name.to_string(),
            StoredTemplate {
                data: Arc::new(data),
                modified_at: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let mut templates = self.templates.write().map_err(|_| poisoned())?;
        Ok(templates.remove(name).is_some())
    }

    fn list(&self) -> Result<Vec<TemplateInfo>, StoreError> {
        let templates = self.templates.read().map_err(|_| poisoned())?;
        Ok(templates
            .iter()
            .map(|(name, t)| TemplateInfo {
                name: name.clone(),
                size: t.data.len() as u64,
                modified_at: Some(t.modified_at),
            })
            .collect())
    }

    fn exists(&self, name: &str) -> bool {
        self.templates
            .read()
            .map(|t| t.contains_key(name))
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "InMemoryTemplateStore"
    }
}
