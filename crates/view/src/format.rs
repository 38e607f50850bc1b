//! Display formatting shared by the view model and template helpers.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use rapport_jpath::resolve;
use serde_json::Value;

/// The one display form for dates: day/month/year, zero-padded.
pub const DISPLAY_DATE: &str = "%d/%m/%Y";

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Formats a stored date as `dd/mm/yyyy`.
///
/// Accepts RFC 3339 timestamps, naive ISO date-times and dates, `dd/mm/yyyy`, and
/// epoch timestamps in seconds or milliseconds. Anything else renders as an empty
/// string rather than leaking an invalid-date marker into the document.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY_DATE).to_string();
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.format(DISPLAY_DATE).to_string();
        }
    }
    for fmt in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return date.format(DISPLAY_DATE).to_string();
        }
    }
    if raw.len() >= 9 && raw.chars().all(|c| c.is_ascii_digit()) {
        let parsed = raw.parse::<i64>().ok().and_then(|n| {
            if raw.len() >= 12 {
                DateTime::from_timestamp_millis(n)
            } else {
                DateTime::from_timestamp(n, 0)
            }
        });
        if let Some(dt) = parsed {
            return dt.format(DISPLAY_DATE).to_string();
        }
    }
    log::debug!("Unparsable date '{}' rendered as empty", raw);
    String::new()
}

/// Turns a camelCase or snake_case key into a spaced title: `customLens` -> `Custom Lens`.
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in key.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.push(c);
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .join(" ")
}

/// Upper snake case for token names: `uvFilter` -> `UV_FILTER`.
pub fn upper_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower_or_digit = false;
    for c in key.chars() {
        if c == '-' || c == ' ' || c == '.' {
            out.push('_');
            prev_lower_or_digit = false;
        } else if c.is_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.extend(c.to_uppercase());
            prev_lower_or_digit = false;
        } else {
            out.extend(c.to_uppercase());
            prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// One field of a numbered-block row.
#[derive(Debug, Clone, Copy)]
pub struct BlockField {
    pub path: &'static str,
    /// Rendered as `<label>: <value>` when set.
    pub label: Option<&'static str>,
    /// Kept in the row even when its value is empty.
    pub always: bool,
}

impl BlockField {
    pub const fn plain(path: &'static str) -> Self {
        Self {
            path,
            label: None,
            always: false,
        }
    }

    pub const fn labelled(path: &'static str, label: &'static str) -> Self {
        Self {
            path,
            label: Some(label),
            always: false,
        }
    }

    /// A labelled field that always occupies its place, as `<label>:` when empty.
    pub const fn column(path: &'static str, label: &'static str) -> Self {
        Self {
            path,
            label: Some(label),
            always: true,
        }
    }
}

/// Renders a list as `"<n>. <field> - <field>"` lines joined by newlines.
///
/// Items are numbered from 1 in input order. Absent fields are omitted from a row
/// unless they are columns; rows with no fields at all are skipped and do not
/// consume a number. A bare string item is used as its own single field.
pub fn numbered_block(items: &[Value], fields: &[BlockField]) -> String {
    items
        .iter()
        .filter_map(|item| {
            let parts: Vec<String> = match item {
                Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
                Value::Object(_) => fields
                    .iter()
                    .filter_map(|field| {
                        let value = resolve(item, field.path, "");
                        let value = value.trim();
                        if value.is_empty() && !field.always {
                            return None;
                        }
                        Some(match field.label {
                            Some(label) => format!("{}: {}", label, value).trim_end().to_string(),
                            None => value.to_string(),
                        })
                    })
                    .collect(),
                _ => Vec::new(),
            };
            if parts.is_empty() { None } else { Some(parts.join(" - ")) }
        })
        .enumerate()
        .map(|(i, row)| format!("{}. {}", i + 1, row))
        .join("\n")
}

/// One `|`-separated segment of a summary line.
#[derive(Debug, Clone, Copy)]
pub struct SummarySegment {
    pub path: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
}

/// Joins `<label>: <value><unit>` segments with `" | "`, omitting absent sources.
pub fn summary_line(source: &Value, segments: &[SummarySegment]) -> String {
    segments
        .iter()
        .filter_map(|segment| {
            let value = resolve(source, segment.path, "");
            let value = value.trim();
            if value.is_empty() {
                None
            } else {
                Some(format!("{}: {}{}", segment.label, value, segment.unit))
            }
        })
        .join(" | ")
}
