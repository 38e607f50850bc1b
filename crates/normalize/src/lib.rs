//! Legacy schema migration for checklist sections.
//!
//! Older records store each checklist section as an ordered list of described
//! items; newer ones store an object keyed by catalog key. This crate is the only
//! place that looks at [`Section`]: everything downstream consumes
//! [`NormalizedRecord`], whose sections are keyed and total over their catalog.
//!
//! List items are matched in two phases. The item at position *i* is first tried
//! against catalog entry *i*; if that entry is taken or its label does not match,
//! the whole catalog is searched by description. An item that matches nothing,
//! or matches several open entries, is left out and reported as [`Degraded`].
//! Degradation is never an error.

mod matcher;

pub use matcher::{LABEL_PREFIX_CHARS, matches_label};

use log::{debug, warn};
use rapport_types::{
    ChecklistItem, KeyedSection, LegacyItem, NormalizedRecord, Record, Section, SectionKind,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// A legacy item that could not be placed under a catalog key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum Degraded {
    /// No open catalog entry matched the description.
    #[serde(rename_all = "camelCase")]
    Unmatched {
        section: SectionKind,
        position: usize,
        description: String,
    },
    /// The description matched more than one open catalog entry.
    #[serde(rename_all = "camelCase")]
    Ambiguous {
        section: SectionKind,
        position: usize,
        description: String,
        candidates: Vec<String>,
    },
}

/// What the normalizer had to give up on while migrating one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    /// Sections that arrived in the legacy list shape.
    pub legacy_sections: Vec<SectionKind>,
    pub degraded: Vec<Degraded>,
}

impl NormalizationReport {
    pub fn is_clean(&self) -> bool {
        self.degraded.is_empty()
    }
}

/// A normalized record together with its migration report.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub record: NormalizedRecord,
    pub report: NormalizationReport,
}

/// Returns true if any checklist section of `record` is in the legacy list shape.
pub fn is_legacy(record: &Record) -> bool {
    SectionKind::ALL
        .iter()
        .any(|kind| matches!(record.section(*kind), Some(Section::LegacyList(_))))
}

/// Migrates every checklist section of `record` to the keyed shape.
pub fn normalize(record: &Record) -> Normalized {
    let mut report = NormalizationReport::default();
    let mut sections = BTreeMap::new();

    for kind in SectionKind::ALL {
        let section = record.section(kind);
        if matches!(section, Some(Section::LegacyList(_))) {
            report.legacy_sections.push(kind);
        }
        let (keyed, degraded) = normalize_section(kind, section);
        report.degraded.extend(degraded);
        sections.insert(kind, keyed);
    }

    if !report.legacy_sections.is_empty() {
        debug!(
            "[NORMALIZE] Report '{}': migrated legacy sections {:?} ({} degraded items)",
            record.report_number,
            report.legacy_sections,
            report.degraded.len()
        );
    }

    Normalized {
        record: NormalizedRecord {
            report_number: record.report_number.clone(),
            report_type: record.report_type.clone(),
            date: record.date.clone(),
            sections,
            metadata: record.metadata.clone(),
        },
        report,
    }
}

/// Produces the keyed form of one section, total over the section's catalog.
pub fn normalize_section(
    kind: SectionKind,
    section: Option<&Section>,
) -> (KeyedSection, Vec<Degraded>) {
    let (mut items, degraded) = match section {
        None => (BTreeMap::new(), Vec::new()),
        Some(Section::Keyed(items)) => (items.clone(), Vec::new()),
        Some(Section::LegacyList(list)) => migrate_list(kind, list),
    };

    for entry in kind.catalog() {
        items
            .entry(entry.key.to_string())
            .or_insert_with(ChecklistItem::empty);
    }

    (KeyedSection { items }, degraded)
}

fn migrate_list(
    kind: SectionKind,
    list: &[LegacyItem],
) -> (BTreeMap<String, ChecklistItem>, Vec<Degraded>) {
    let catalog = kind.catalog();
    let mut items: BTreeMap<String, ChecklistItem> = BTreeMap::new();
    let mut degraded = Vec::new();

    for (position, legacy) in list.iter().enumerate() {
        let positional = catalog.get(position).filter(|entry| {
            !items.contains_key(entry.key) && matches_label(&legacy.description, entry.label)
        });

        let key = match positional {
            Some(entry) => Some(entry.key),
            None => {
                let found = matcher::candidates(catalog, &legacy.description, |entry| {
                    !items.contains_key(entry.key)
                });
                match found.as_slice() {
                    [single] => Some(single.key),
                    [] => {
                        warn!(
                            "[NORMALIZE] {} item #{} '{}' matches no open checklist entry",
                            kind, position, legacy.description
                        );
                        degraded.push(Degraded::Unmatched {
                            section: kind,
                            position,
                            description: legacy.description.clone(),
                        });
                        None
                    }
                    several => {
                        let candidates: Vec<String> =
                            several.iter().map(|entry| entry.key.to_string()).collect();
                        warn!(
                            "[NORMALIZE] {} item #{} '{}' is ambiguous between {:?}; left unassigned",
                            kind, position, legacy.description, candidates
                        );
                        degraded.push(Degraded::Ambiguous {
                            section: kind,
                            position,
                            description: legacy.description.clone(),
                            candidates,
                        });
                        None
                    }
                }
            }
        };

        if let Some(key) = key {
            items.insert(
                key.to_string(),
                ChecklistItem::new(legacy.status.clone(), legacy.result.clone()),
            );
        }
    }

    (items, degraded)
}
