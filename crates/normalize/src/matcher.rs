//! Description-to-label matching for legacy checklist items.
use rapport_types::CatalogEntry;

/// Number of leading label characters an item description must contain.
pub const LABEL_PREFIX_CHARS: usize = 10;

/// Case-insensitive check that `description` contains the first
/// [`LABEL_PREFIX_CHARS`] characters of `label`.
pub fn matches_label(description: &str, label: &str) -> bool {
    let description = description.trim().to_lowercase();
    if description.is_empty() {
        return false;
    }
    let prefix: String = label
        .trim()
        .to_lowercase()
        .chars()
        .take(LABEL_PREFIX_CHARS)
        .collect();
    !prefix.is_empty() && description.contains(&prefix)
}

/// Catalog entries matching `description` that are still accepted by `is_open`.
pub fn candidates<'c>(
    catalog: &'c [CatalogEntry],
    description: &str,
    is_open: impl Fn(&CatalogEntry) -> bool,
) -> Vec<&'c CatalogEntry> {
    catalog
        .iter()
        .filter(|entry| is_open(entry) && matches_label(description, entry.label))
        .collect()
}
