//! Template helpers registered by both renderers.
//!
//! Built-in handlebars helpers already cover `eq`, `ne`, `and`, `or`, `not` and
//! `len`; the ones here add display formatting and gallery iteration.

use handlebars::{Handlebars, handlebars_helper};
use rapport_view::{asset_src, format_date};
use serde_json::{Value, json};

/// Block helpers a template may open with `{{#name}}`.
pub const BLOCK_HELPERS: &[&str] = &["if", "unless", "each", "with"];

/// Every helper name callable with arguments, built-ins included.
pub const KNOWN_HELPERS: &[&str] = &[
    "if", "unless", "each", "with", "lookup", "log", "eq", "ne", "gt", "gte", "lt", "lte", "and",
    "or", "not", "len", "default", "formatDate", "join", "assetSrc", "gallery",
];

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

handlebars_helper!(default_value: |value: Json, fallback: Json| {
    if is_blank(value) { fallback.clone() } else { value.clone() }
});

handlebars_helper!(format_date_value: |value: Json| format_date(&scalar_text(value)));

handlebars_helper!(join_values: |items: Json, separator: str| {
    match items {
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(separator),
        other => scalar_text(other),
    }
});

handlebars_helper!(asset_src_value: |item: Json| asset_src(item));

handlebars_helper!(gallery_items: |items: Json| {
    match items {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    json!({
                        "src": asset_src(item),
                        "caption": item.get("caption").map(scalar_text).unwrap_or_default(),
                        "label": item.get("label").map(scalar_text).unwrap_or_default(),
                        "index": index + 1,
                    })
                })
                .collect(),
        ),
        _ => Value::Array(Vec::new()),
    }
});

/// Registers the shared helpers on `registry`.
pub fn register_helpers(registry: &mut Handlebars<'_>) {
    registry.register_helper("default", Box::new(default_value));
    registry.register_helper("formatDate", Box::new(format_date_value));
    registry.register_helper("join", Box::new(join_values));
    registry.register_helper("assetSrc", Box::new(asset_src_value));
    registry.register_helper("gallery", Box::new(gallery_items));
}
