//! Directory-backed template store.
//!
//! Every template is a file directly inside the base directory. Names are
//! validated and resolved paths are re-checked against the canonical base so a
//! name can never reach outside it (e.g. `../../../etc/passwd`).

use rapport_traits::{SharedTemplateData, StoreError, TemplateInfo, TemplateStore, validate_name};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A template store over one local directory.
#[derive(Debug)]
pub struct FilesystemTemplateStore {
    base_path: PathBuf,
}

impl FilesystemTemplateStore {
    /// Opens a store over `base_path`, creating the directory if it is missing.
    pub fn open<P: AsRef<Path>>(base_path: P) -> Result<Self, StoreError> {
        let base = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base)?;
        log::debug!("Template store opened at {}", base.display());
        Ok(Self { base_path: base })
    }

    pub fn base(&self) -> &Path {
        &self.base_path
    }

    /// Resolves `name` to a path inside the base directory.
    fn resolve_path_safe(&self, name: &str) -> Result<PathBuf, StoreError> {
        validate_name(name)?;
        let full_path = self.base_path.join(name);

        // Symlinks may still point elsewhere; compare canonical forms when the file exists.
        if let (Ok(canonical), Ok(base)) = (full_path.canonicalize(), self.base_path.canonicalize())
            && !canonical.starts_with(&base)
        {
            log::warn!("Blocked template path escaping the store: {}", name);
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(full_path)
    }
}

fn not_found_or_io(name: &str, err: std::io::Error) -> StoreError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StoreError::NotFound(name.to_string())
    } else {
        StoreError::Io(format!("{name}: {err}"))
    }
}

impl TemplateStore for FilesystemTemplateStore {
    fn load(&self, name: &str) -> Result<SharedTemplateData, StoreError> {
        let path = self.resolve_path_safe(name)?;
        fs::read(&path)
            .map(Arc::new)
            .map_err(|e| not_found_or_io(name, e))
    }

    fn save(&self, name: &str, data: Vec<u8>) -> Result<(), StoreError> {
        let path = self.resolve_path_safe(name)?;
        fs::write(&path, data)?;
        log::info!("Saved template '{}'", name);
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.resolve_path_safe(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Deleted template '{}'", name);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<TemplateInfo>, StoreError> {
        let mut templates = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            templates.push(TemplateInfo {
                name,
                size: metadata.len(),
                modified_at: metadata.modified().ok(),
            });
        }
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve_path_safe(name)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    fn name(&self) -> &'static str {
        "FilesystemTemplateStore"
    }
}
