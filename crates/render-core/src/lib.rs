//! Shared rendering vocabulary for the rapport renderers.
//!
//! - [`RenderError`], the failure type of both renderers
//! - [`RenderOptions`], page geometry for paginated output
//! - [`PackageOutput`] and [`PdfOutput`], the produced artifacts
//! - output naming and PDF inspection helpers
//! - template helpers shared by both renderers

mod error;
pub mod helpers;
mod types;
pub mod utils;

pub use error::RenderError;
pub use helpers::{BLOCK_HELPERS, KNOWN_HELPERS, register_helpers};
pub use types::{PackageOutput, PdfOutput, RenderOptions};
pub use utils::{inspect_pdf, output_file_name};
