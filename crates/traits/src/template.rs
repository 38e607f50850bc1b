//! Template naming rules.
use crate::store::StoreError;

/// The two template flavours a report can be rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// An office-document package (`.docx`).
    Package,
    /// An HTML page for the browser renderer.
    Html,
}

impl TemplateKind {
    pub fn extension(self) -> &'static str {
        match self {
            TemplateKind::Package => "docx",
            TemplateKind::Html => "html",
        }
    }
}

/// Rejects names that could address anything outside a flat template namespace.
pub fn validate_name(name: &str) -> Result<(), StoreError> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed != name
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.contains("..");
    if invalid {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Stored file name for template `name` of `kind`.
///
/// A name already carrying the kind's extension is used as-is.
pub fn template_file_name(name: &str, kind: TemplateKind) -> String {
    let suffix = format!(".{}", kind.extension());
    if name.to_ascii_lowercase().ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}
