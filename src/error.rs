// src/error.rs
use rapport_render_core::RenderError;
use rapport_traits::StoreError;
use thiserror::Error;

/// A comprehensive error type for the report rendering pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Template store error: {0}")]
    Store(#[from] StoreError),
}

impl From<config::ConfigError> for PipelineError {
    fn from(e: config::ConfigError) -> Self {
        PipelineError::Config(e.to_string())
    }
}
