//! Photo and signature gallery entries.
use crate::format::humanize_key;
use rapport_jpath::resolve;
use serde_json::{Map, Value, json};

/// The displayable source of an asset reference, or `""` when none exists.
///
/// Looks at `src`, `url`, then `dataUri`, then `data` paired with `mimeType` (emitted as a
/// base64 data URI). A bare string is taken as the reference itself.
pub fn asset_src(item: &Value) -> String {
    match item {
        Value::String(s) => s.trim().to_string(),
        Value::Object(_) => {
            for key in ["src", "url", "dataUri"] {
                let value = resolve(item, key, "");
                if !value.trim().is_empty() {
                    return value.trim().to_string();
                }
            }
            let data = resolve(item, "data", "");
            let mime = resolve(item, "mimeType", "");
            if !data.trim().is_empty() && !mime.trim().is_empty() {
                return format!("data:{};base64,{}", mime.trim(), data.trim());
            }
            String::new()
        }
        _ => String::new(),
    }
}

fn entry(item: &Value, fallback_label: String) -> Value {
    let caption = ["caption", "description", "name"]
        .iter()
        .map(|key| resolve(item, key, ""))
        .find(|v| !v.is_empty())
        .unwrap_or_default();
    let label = ["label", "role"]
        .iter()
        .map(|key| resolve(item, key, ""))
        .find(|v| !v.is_empty())
        .unwrap_or(fallback_label);
    json!({
        "src": asset_src(item),
        "caption": caption,
        "label": label,
    })
}

/// Gallery entries for a photo list. Non-list input yields an empty gallery.
pub fn photo_gallery(photos: Option<&Value>) -> Vec<Value> {
    match photos {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| entry(item, format!("Photo {}", i + 1)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Gallery entries for signatures, given either as a list or as a map keyed by role.
pub fn signature_gallery(signatures: Option<&Value>) -> Vec<Value> {
    match signatures {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| entry(item, format!("Signature {}", i + 1)))
            .collect(),
        Some(Value::Object(map)) => by_role(map),
        _ => Vec::new(),
    }
}

fn by_role(map: &Map<String, Value>) -> Vec<Value> {
    map.iter()
        .filter(|(_, item)| !item.is_null())
        .map(|(role, item)| entry(item, humanize_key(role)))
        .collect()
}
