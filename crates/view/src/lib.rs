//! The render view model: one JSON object per record, shared by every renderer.
//!
//! The model keeps the record's own fields (nested objects intact so templates can
//! address `site.name`) and adds derived values: display dates, numbered text blocks
//! for repeating sections, per-section checklist rows, an environment summary line
//! and asset galleries. Derived values live under their own keys; the record's
//! `photos` and `signatures` stay as stored, with galleries under `photoList` and
//! `signatureList`.

pub mod format;
pub mod gallery;

use chrono::{DateTime, Utc};
use rapport_types::{KeyedSection, NormalizedRecord, SectionKind};
use serde_json::{Map, Value, json};

pub use format::{BlockField, SummarySegment, format_date, humanize_key, numbered_block, summary_line, upper_snake};
pub use gallery::{asset_src, photo_gallery, signature_gallery};

const OBSERVATION_FIELDS: &[BlockField] = &[
    BlockField::plain("description"),
    BlockField::labelled("status", "Status"),
    BlockField::plain("remarks"),
];

const PART_FIELDS: &[BlockField] = &[
    BlockField::plain("partName"),
    BlockField::labelled("partNumber", "Part No"),
    BlockField::labelled("quantity", "Qty"),
];

const CHECKLIST_FIELDS: &[BlockField] = &[
    BlockField::plain("label"),
    BlockField::column("status", "Status"),
    BlockField::column("result", "Result"),
];

/// Record keys that may hold environmental readings, in preference order.
const ENVIRONMENT_KEYS: &[&str] = &["environment", "environmentalConditions"];

const ENVIRONMENT_SEGMENTS: &[SummarySegment] = &[
    SummarySegment { path: "temperature", label: "Temperature", unit: "°C" },
    SummarySegment { path: "humidity", label: "Humidity", unit: "%" },
    SummarySegment { path: "airPollutionLevel", label: "Air Pollution", unit: "" },
    SummarySegment { path: "hvacStatus", label: "HVAC", unit: "" },
];

/// Builds the view model for `record`, stamped with `generated_at`.
///
/// Never fails. Missing or malformed source fields produce empty derived values.
pub fn build_view_model(record: &NormalizedRecord, generated_at: DateTime<Utc>) -> Value {
    let mut view: Map<String, Value> = record.metadata.clone();

    view.insert("reportNumber".into(), Value::String(record.report_number.clone()));
    view.insert("reportType".into(), Value::String(record.report_type.clone()));
    view.insert("date".into(), Value::String(record.date.clone()));
    view.insert("reportDateFormatted".into(), Value::String(format_date(&record.date)));

    let mut checklist_text = Map::new();
    let mut checklist_rows = Map::new();
    for kind in SectionKind::ALL {
        let empty = KeyedSection::default();
        let section = record.section(kind).unwrap_or(&empty);
        let rows = section_rows(kind, section);

        view.insert(kind.field_name().into(), section_object(section));
        let filled: Vec<Value> = rows
            .iter()
            .filter(|row| !row_is_empty(row))
            .cloned()
            .collect();
        checklist_text.insert(
            kind.field_name().into(),
            Value::String(numbered_block(&filled, CHECKLIST_FIELDS)),
        );
        checklist_rows.insert(kind.field_name().into(), Value::Array(rows));
    }
    view.insert("checklistText".into(), Value::Object(checklist_text));
    view.insert("checklistRows".into(), Value::Object(checklist_rows));

    let observations = list_at(&record.metadata, "observations");
    view.insert(
        "observationsText".into(),
        Value::String(numbered_block(observations, OBSERVATION_FIELDS)),
    );
    let parts = list_at(&record.metadata, "recommendedParts");
    view.insert(
        "recommendedPartsText".into(),
        Value::String(numbered_block(parts, PART_FIELDS)),
    );

    let environment = ENVIRONMENT_KEYS
        .iter()
        .find_map(|key| record.metadata.get(*key).filter(|v| v.is_object()));
    let summary = environment
        .map(|env| summary_line(env, ENVIRONMENT_SEGMENTS))
        .unwrap_or_default();
    view.insert("environmentSummary".into(), Value::String(summary));

    view.insert(
        "photoList".into(),
        Value::Array(photo_gallery(record.metadata.get("photos"))),
    );
    view.insert(
        "signatureList".into(),
        Value::Array(signature_gallery(record.metadata.get("signatures"))),
    );

    view.insert("generatedAt".into(), Value::String(generated_at.to_rfc3339()));
    view.insert(
        "generatedAtFormatted".into(),
        Value::String(generated_at.format("%d/%m/%Y %H:%M").to_string()),
    );

    log::debug!(
        "Built view model for report '{}' with {} top-level fields",
        record.report_number,
        view.len()
    );
    Value::Object(view)
}

fn list_at<'a>(metadata: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match metadata.get(key) {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

fn section_object(section: &KeyedSection) -> Value {
    let items: Map<String, Value> = section
        .items
        .iter()
        .map(|(key, item)| {
            (
                key.clone(),
                json!({ "status": item.status, "result": item.result }),
            )
        })
        .collect();
    Value::Object(items)
}

/// Catalog items first in catalog order, then any extra keys in key order.
fn section_rows(kind: SectionKind, section: &KeyedSection) -> Vec<Value> {
    let catalog = kind.catalog();
    let known = catalog.iter().map(|entry| (entry.key.to_string(), entry.label.to_string()));
    let extra = section
        .items
        .keys()
        .filter(|key| kind.label_for(key).is_none())
        .map(|key| (key.clone(), humanize_key(key)));

    known
        .chain(extra)
        .map(|(key, label)| {
            let item = section.item_or_empty(&key);
            json!({
                "key": key,
                "label": label,
                "status": item.status,
                "result": item.result,
            })
        })
        .collect()
}

fn row_is_empty(row: &Value) -> bool {
    ["status", "result"].iter().all(|field| {
        row.get(*field)
            .and_then(Value::as_str)
            .map(|s| s.trim().is_empty())
            .unwrap_or(true)
    })
}
