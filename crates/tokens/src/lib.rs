//! Token map construction for bracketed literal placeholders.
//!
//! A token map is a flat `NAME -> value` table. Built-in tokens are derived from
//! the view model first; configured [`TokenMapping`]s are then applied in order,
//! so a mapping may override a built-in and a later mapping overrides an earlier
//! one.

use rapport_jpath::resolve;
use rapport_types::{SectionKind, TokenMapping, find_duplicate_tokens};
use rapport_view::upper_snake;
use serde_json::Value;
use std::collections::BTreeMap;

pub type TokenMap = BTreeMap<String, String>;

/// Fixed built-ins as `(token, view path)`.
const BUILTINS: &[(&str, &str)] = &[
    ("REPORT_NUMBER", "reportNumber"),
    ("REPORT_TYPE", "reportType"),
    ("DATE", "reportDateFormatted"),
    ("REPORT_DATE", "reportDateFormatted"),
    ("SITE_NAME", "site.name"),
    ("SITE_ADDRESS", "site.address"),
    ("SITE_CITY", "site.city"),
    ("SITE_CONTACT", "site.contactPerson"),
    ("SITE_PHONE", "site.contactPhone"),
    ("ENGINEER_NAME", "engineer.name"),
    ("ENGINEER_PHONE", "engineer.phone"),
    ("ENGINEER_EMAIL", "engineer.email"),
    ("PROJECTOR_MODEL", "projector.model"),
    ("PROJECTOR_SERIAL", "projector.serialNumber"),
    ("PROJECTOR_BRAND", "projector.brand"),
    ("PROJECTOR_LOCATION", "projector.auditorium"),
    ("LAMP_MODEL", "lamp.model"),
    ("LAMP_HOURS", "lamp.hours"),
    ("ENVIRONMENT", "environmentSummary"),
    ("TEMPERATURE", "environment.temperature"),
    ("HUMIDITY", "environment.humidity"),
    ("OBSERVATIONS", "observationsText"),
    ("RECOMMENDED_PARTS", "recommendedPartsText"),
    ("GENERATED_AT", "generatedAtFormatted"),
];

/// Token name for one checklist field, e.g. `OPT_UV_FILTER_STATUS`.
pub fn item_token(kind: SectionKind, key: &str, field: ItemField) -> String {
    format!("{}_{}_{}", kind.token_prefix(), upper_snake(key), field.suffix())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Status,
    Result,
}

impl ItemField {
    pub const BOTH: [ItemField; 2] = [ItemField::Status, ItemField::Result];

    fn suffix(self) -> &'static str {
        match self {
            ItemField::Status => "STATUS",
            ItemField::Result => "RESULT",
        }
    }

    fn field(self) -> &'static str {
        match self {
            ItemField::Status => "status",
            ItemField::Result => "result",
        }
    }
}

/// Every built-in token name, catalog-derived ones included.
pub fn builtin_tokens() -> Vec<String> {
    let mut names: Vec<String> = BUILTINS.iter().map(|(token, _)| token.to_string()).collect();
    for kind in SectionKind::ALL {
        names.push(kind.block_token().to_string());
        for entry in kind.catalog() {
            names.extend(ItemField::BOTH.iter().map(|field| item_token(kind, entry.key, *field)));
        }
    }
    names
}

/// Builds the token map for `view`.
///
/// Unknown mapping paths resolve to that mapping's own default. Never fails.
pub fn build_token_map(view: &Value, mappings: &[TokenMapping]) -> TokenMap {
    let mut tokens = TokenMap::new();

    for (token, path) in BUILTINS {
        tokens.insert(token.to_string(), resolve(view, path, ""));
    }

    for kind in SectionKind::ALL {
        let block_path = format!("checklistText.{}", kind.field_name());
        tokens.insert(kind.block_token().to_string(), resolve(view, &block_path, ""));

        let Some(Value::Object(items)) = view.get(kind.field_name()) else {
            continue;
        };
        for (key, item) in items {
            for field in ItemField::BOTH {
                tokens.insert(item_token(kind, key, field), resolve(item, field.field(), ""));
            }
        }
    }

    let duplicates = find_duplicate_tokens(mappings);
    if !duplicates.is_empty() {
        log::warn!("[TOKENS] Duplicate mapping tokens, last entry wins: {:?}", duplicates);
    }
    for mapping in mappings {
        let value = resolve(view, &mapping.path, &mapping.default);
        if let Some(previous) = tokens.insert(mapping.token.clone(), value) {
            log::debug!("[TOKENS] Mapping '{}' replaced value '{}'", mapping.token, previous);
        }
    }

    tokens
}
