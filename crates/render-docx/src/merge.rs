//! Pass 1: structured merge of `{{ ... }}` tags.
use crate::escape::xml_escape_with_breaks;
use handlebars::Handlebars;
use rapport_render_core::{RenderError, register_helpers};
use serde_json::Value;

/// A template registry whose output is safe inside `<w:t>` elements.
pub fn merge_registry() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(false);
    registry.register_escape_fn(xml_escape_with_breaks);
    register_helpers(&mut registry);
    registry
}

/// Renders one consolidated, validated part against the view model.
pub fn merge_part(
    registry: &Handlebars<'_>,
    part_name: &str,
    xml: &str,
    view: &Value,
) -> Result<String, RenderError> {
    registry
        .render_template(xml, view)
        .map_err(|e| RenderError::syntax(format!("{part_name}: {e}")))
}
