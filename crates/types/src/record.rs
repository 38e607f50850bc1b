//! Inspection records in both their stored and their normalized form.
use crate::catalog::SectionKind;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The value every absent status or result resolves to.
pub const EMPTY_MARKER: &str = "";

/// Coerces any JSON scalar into its string form; `null` and absent become the empty marker.
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => EMPTY_MARKER.to_string(),
    })
}

/// A section in neither shape is treated as absent; see [`Section::from_value`].
fn lenient_section<'de, D>(deserializer: D) -> Result<Option<Section>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(Section::from_value))
}

/// A checklist item in its keyed form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub status: String,
    #[serde(default, alias = "yesNoOk", deserialize_with = "string_or_empty")]
    pub result: String,
}

impl ChecklistItem {
    pub fn new(status: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            result: result.into(),
        }
    }

    /// An item carrying the empty marker for both fields.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_empty() && self.result.is_empty()
    }
}

/// A checklist item in the legacy list shape, identified only by its description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyItem {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub status: String,
    #[serde(default, alias = "yesNoOk", deserialize_with = "string_or_empty")]
    pub result: String,
}

impl LegacyItem {
    pub fn new(
        description: impl Into<String>,
        status: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            status: status.into(),
            result: result.into(),
        }
    }
}

/// A checklist section as stored.
///
/// Older records carry an ordered list of described items; newer ones carry an
/// object keyed by catalog key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Section {
    LegacyList(Vec<LegacyItem>),
    Keyed(BTreeMap<String, ChecklistItem>),
}

impl Section {
    /// Reads a section item by item, so one malformed entry never costs its neighbours.
    ///
    /// In a list, a bare string is taken as a description and any other non-object
    /// entry keeps its position as an item with no description, which the
    /// normalizer then reports. In a keyed section, a non-object value becomes the
    /// empty item. Returns `None` for null and for anything that is neither a list
    /// nor an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(entries) => Some(Section::LegacyList(
                entries.into_iter().enumerate().map(legacy_entry).collect(),
            )),
            Value::Object(entries) => Some(Section::Keyed(
                entries
                    .into_iter()
                    .map(|(key, raw)| {
                        let item = keyed_entry(&key, raw);
                        (key, item)
                    })
                    .collect(),
            )),
            other => {
                log::warn!("Ignoring checklist section with unrecognised shape: {}", other);
                None
            }
        }
    }
}

impl<'de> Deserialize<'de> for Section {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Section::from_value(value)
            .ok_or_else(|| serde::de::Error::custom("expected a list or an object of checklist items"))
    }
}

fn legacy_entry((position, raw): (usize, Value)) -> LegacyItem {
    match raw {
        Value::Object(_) => serde_json::from_value(raw).unwrap_or_else(|e| {
            log::warn!("Checklist entry #{} could not be read: {}", position, e);
            LegacyItem::default()
        }),
        Value::String(description) => LegacyItem::new(description, EMPTY_MARKER, EMPTY_MARKER),
        other => {
            log::warn!("Checklist entry #{} is not an item: {}", position, other);
            LegacyItem::default()
        }
    }
}

fn keyed_entry(key: &str, raw: Value) -> ChecklistItem {
    match raw {
        Value::Object(_) => serde_json::from_value(raw).unwrap_or_else(|e| {
            log::warn!("Checklist entry '{}' could not be read: {}", key, e);
            ChecklistItem::empty()
        }),
        Value::Null => ChecklistItem::empty(),
        other => {
            log::warn!("Checklist entry '{}' is not an item: {}", key, other);
            ChecklistItem::empty()
        }
    }
}

/// An inspection report as received from the record store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub report_number: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub report_type: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub date: String,

    #[serde(default, deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub optics: Option<Section>,
    #[serde(default, deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub electronics: Option<Section>,
    #[serde(default, deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub mechanical: Option<Section>,
    #[serde(default, deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub consumables: Option<Section>,
    #[serde(default, deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub coolant: Option<Section>,
    #[serde(default, deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub light_engine_test_patterns: Option<Section>,
    #[serde(default, deserialize_with = "lenient_section", skip_serializing_if = "Option::is_none")]
    pub image_evaluation: Option<Section>,

    /// Everything else: site, engineer, projector, environment, observations, photos...
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Record {
    /// Parses a record from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        match kind {
            SectionKind::Optics => self.optics.as_ref(),
            SectionKind::Electronics => self.electronics.as_ref(),
            SectionKind::Mechanical => self.mechanical.as_ref(),
            SectionKind::Consumables => self.consumables.as_ref(),
            SectionKind::Coolant => self.coolant.as_ref(),
            SectionKind::LightEngineTestPatterns => self.light_engine_test_patterns.as_ref(),
            SectionKind::ImageEvaluation => self.image_evaluation.as_ref(),
        }
    }

    pub fn set_section(&mut self, kind: SectionKind, section: Option<Section>) {
        let slot = match kind {
            SectionKind::Optics => &mut self.optics,
            SectionKind::Electronics => &mut self.electronics,
            SectionKind::Mechanical => &mut self.mechanical,
            SectionKind::Consumables => &mut self.consumables,
            SectionKind::Coolant => &mut self.coolant,
            SectionKind::LightEngineTestPatterns => &mut self.light_engine_test_patterns,
            SectionKind::ImageEvaluation => &mut self.image_evaluation,
        };
        *slot = section;
    }
}

/// A checklist section in the keyed shape, total over its catalog keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyedSection {
    pub items: BTreeMap<String, ChecklistItem>,
}

impl KeyedSection {
    pub fn get(&self, key: &str) -> Option<&ChecklistItem> {
        self.items.get(key)
    }

    /// Returns the item for `key`, or the empty marker item if absent.
    pub fn item_or_empty(&self, key: &str) -> ChecklistItem {
        self.items.get(key).cloned().unwrap_or_default()
    }
}

/// A record whose checklist sections have all been migrated to the keyed shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    pub report_number: String,
    pub report_type: String,
    pub date: String,
    pub sections: BTreeMap<SectionKind, KeyedSection>,
    pub metadata: Map<String, Value>,
}

impl NormalizedRecord {
    pub fn section(&self, kind: SectionKind) -> Option<&KeyedSection> {
        self.sections.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_legacy_list_section() {
        let record: Record = serde_json::from_value(json!({
            "reportNumber": "RPT-1",
            "optics": [
                { "description": "Reflector", "status": "Checked", "yesNoOk": "OK" }
            ]
        }))
        .unwrap();

        assert_eq!(record.report_number, "RPT-1");
        assert_eq!(
            record.optics,
            Some(Section::LegacyList(vec![LegacyItem::new("Reflector", "Checked", "OK")]))
        );
    }

    #[test]
    fn parses_keyed_section_and_coerces_nulls() {
        let record: Record = serde_json::from_value(json!({
            "optics": {
                "reflector": { "status": null, "result": "OK" },
                "uvFilter": { "status": 3 }
            }
        }))
        .unwrap();

        let Some(Section::Keyed(items)) = record.optics else {
            panic!("expected keyed section");
        };
        assert_eq!(items["reflector"], ChecklistItem::new("", "OK"));
        assert_eq!(items["uvFilter"], ChecklistItem::new("3", ""));
    }

    #[test]
    fn unrecognised_section_shape_is_absent() {
        let record: Record = serde_json::from_value(json!({ "coolant": "n/a" })).unwrap();
        assert!(record.coolant.is_none());
    }

    #[test]
    fn malformed_list_entries_keep_their_place() {
        let record: Record = serde_json::from_value(json!({
            "optics": [
                { "description": "Reflector", "status": "Checked", "result": "OK" },
                null,
                "UV Filter",
                7
            ]
        }))
        .unwrap();

        assert_eq!(
            record.optics,
            Some(Section::LegacyList(vec![
                LegacyItem::new("Reflector", "Checked", "OK"),
                LegacyItem::default(),
                LegacyItem::new("UV Filter", "", ""),
                LegacyItem::default(),
            ]))
        );
    }

    #[test]
    fn malformed_keyed_entries_become_empty_items() {
        let record: Record = serde_json::from_value(json!({
            "optics": {
                "reflector": { "status": "Checked", "result": "OK" },
                "uvFilter": null,
                "coldMirror": "cleaned"
            }
        }))
        .unwrap();

        let Some(Section::Keyed(items)) = record.optics else {
            panic!("expected keyed section");
        };
        assert_eq!(items["reflector"], ChecklistItem::new("Checked", "OK"));
        assert_eq!(items["uvFilter"], ChecklistItem::empty());
        assert_eq!(items["coldMirror"], ChecklistItem::empty());
    }

    #[test]
    fn metadata_is_kept_verbatim() {
        let record: Record = serde_json::from_value(json!({
            "reportNumber": 42,
            "site": { "name": "Grand Cinema" },
            "observations": [{ "description": "Dusty lens" }]
        }))
        .unwrap();

        assert_eq!(record.report_number, "42");
        assert_eq!(record.metadata["site"]["name"], json!("Grand Cinema"));
        assert!(record.metadata.contains_key("observations"));
        assert!(!record.metadata.contains_key("reportNumber"));
    }

    #[test]
    fn section_accessors_round_trip() {
        let mut record = Record::default();
        record.set_section(SectionKind::Coolant, Some(Section::LegacyList(vec![])));
        assert_eq!(
            record.section(SectionKind::Coolant),
            Some(&Section::LegacyList(vec![]))
        );
        assert!(record.section(SectionKind::Optics).is_none());
    }
}
