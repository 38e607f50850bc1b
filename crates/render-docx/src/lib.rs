//! Office-document (docx) report rendering.
//!
//! A template package is decompressed into a [`Package`]; its content parts
//! (main document, headers and footers) go through three steps:
//!
//! 1. run consolidation, so no tag is split across text runs;
//! 2. structured merge of `{{ ... }}` tags against the view model;
//! 3. a literal sweep replacing `[TOKEN]`s from the token map.
//!
//! Every tag in every part is validated before anything is merged, and all
//! problems are reported together.

pub mod escape;
pub mod merge;
pub mod package;
pub mod runs;
pub mod sweep;
pub mod tags;

pub use package::Package;

use handlebars::Handlebars;
use rapport_render_core::RenderError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Merges docx templates. Cheap to share; holds only the configured registry.
pub struct PackageRenderer {
    registry: Handlebars<'static>,
}

impl Default for PackageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PackageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageRenderer").finish_non_exhaustive()
    }
}

impl PackageRenderer {
    pub fn new() -> Self {
        Self {
            registry: merge::merge_registry(),
        }
    }

    /// Renders `template` (package bytes) into a new package.
    pub fn render(
        &self,
        template: &[u8],
        view: &Value,
        tokens: &BTreeMap<String, String>,
    ) -> Result<Vec<u8>, RenderError> {
        let mut package = Package::read(template)?;

        let mut parts = Vec::new();
        for name in package.content_parts() {
            let Some(bytes) = package.part(&name) else {
                continue;
            };
            let xml = std::str::from_utf8(bytes)
                .map_err(|e| RenderError::Package(format!("{name} is not UTF-8: {e}")))?;
            parts.push((name.clone(), runs::consolidate_runs(xml)?));
        }

        let problems: Vec<String> = parts
            .iter()
            .flat_map(|(name, xml)| {
                tags::validate_template(xml, view)
                    .into_iter()
                    .map(move |problem| format!("{name}: {problem}"))
            })
            .collect();
        if !problems.is_empty() {
            log::warn!("[PACKAGE] Template rejected with {} problem(s)", problems.len());
            return Err(RenderError::TemplateSyntax { fields: problems });
        }

        for (name, xml) in parts {
            let merged = merge::merge_part(&self.registry, &name, &xml, view)?;
            let swept = sweep::sweep_tokens(&merged, tokens);
            package.set_part(&name, swept.into_bytes());
        }

        let bytes = package.write()?;
        log::info!("[PACKAGE] Rendered package ({} bytes)", bytes.len());
        Ok(bytes)
    }
}
