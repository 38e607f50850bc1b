//! Field-service report rendering.
//!
//! A [`Record`] is normalized, flattened into a view model and a token map, then
//! merged into an office-document package template and, optionally, rendered
//! from an HTML template to PDF by an external browser engine.
//!
//! The stages live in their own crates and are re-exported here; this crate
//! adds the [`ReportPipeline`] that ties them together, layered configuration
//! and the `rapport` command-line tool.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::RapportConfig;
pub use error::PipelineError;
pub use pipeline::{
    PipelineBuilder, PreparedReport, RenderRequest, RenderedReport, ReportPipeline, prepare,
};

pub use rapport_normalize::{Degraded, NormalizationReport};
pub use rapport_render_browser::{CancelSignal, EngineConfig, RenderEngine};
pub use rapport_render_core::{PackageOutput, PdfOutput, RenderError, RenderOptions};
pub use rapport_tokens::{TokenMap, builtin_tokens};
pub use rapport_traits::{StoreError, TemplateInfo, TemplateStore};
pub use rapport_types::{Margins, PageSize, Record, TokenMapping};
