use rapport_traits::StoreError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    NotFound(String),
    /// Every offending tag or field found in one template, not just the first.
    #[error("Template syntax error: {}", fields.join("; "))]
    TemplateSyntax { fields: Vec<String> },
    #[error("Malformed document package: {0}")]
    Package(String),
    #[error("Render engine failure: {0}")]
    RenderEngine(String),
    #[error("Render engine timed out after {0:?}")]
    Timeout(Duration),
    #[error("Render cancelled")]
    Cancelled,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn syntax(message: impl Into<String>) -> Self {
        RenderError::TemplateSyntax {
            fields: vec![message.into()],
        }
    }
}

impl From<StoreError> for RenderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(name) | StoreError::InvalidName(name) => RenderError::NotFound(name),
            StoreError::Io(message) => RenderError::Io(std::io::Error::other(message)),
        }
    }
}

impl From<handlebars::TemplateError> for RenderError {
    fn from(err: handlebars::TemplateError) -> Self {
        RenderError::syntax(err.to_string())
    }
}

impl From<handlebars::RenderError> for RenderError {
    fn from(err: handlebars::RenderError) -> Self {
        RenderError::syntax(err.to_string())
    }
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::RenderEngine(format!("engine produced an unreadable PDF: {err}"))
    }
}
