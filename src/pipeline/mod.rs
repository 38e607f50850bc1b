//! Report rendering pipeline orchestration.
//!
//! - [`PipelineBuilder`]: fluent builder wiring a template store, the package
//!   renderer and the browser engine pool
//! - [`ReportPipeline`]: renders one [`RenderRequest`] into a [`RenderedReport`]
//! - [`prepare`]: the renderer-independent half (normalize, view model, tokens)
//!
//! # Example
//!
//! ```ignore
//! use rapport::{PipelineBuilder, Record};
//!
//! let pipeline = PipelineBuilder::new()
//!     .with_template_dir("templates")?
//!     .with_max_instances(2)
//!     .build()?;
//!
//! let record = Record::from_json(&std::fs::read_to_string("report.json")?)?;
//! let report = pipeline.render_blocking(pipeline.request(record, "service"))?;
//! std::fs::write(&report.package.file_name, &report.package.bytes)?;
//! ```

mod builder;
mod orchestrator;

pub use builder::PipelineBuilder;
pub use orchestrator::{
    PreparedReport, RenderRequest, RenderedReport, ReportPipeline, prepare, template_stem,
};
