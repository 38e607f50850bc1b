use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An operator-defined literal token: `[TOKEN]` resolves to the value found at
/// `path` in the view model, or to `default` when the path does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMapping {
    pub token: String,
    #[serde(alias = "dataPath")]
    pub path: String,
    #[serde(default, alias = "defaultValue")]
    pub default: String,
}

impl TokenMapping {
    pub fn new(token: impl Into<String>, path: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            path: path.into(),
            default: default.into(),
        }
    }
}

/// Returns the token names that occur more than once, in order of their second occurrence.
///
/// The token engine itself applies duplicates last-wins; this is for editors that
/// want to warn before saving a mapping set.
pub fn find_duplicate_tokens(mappings: &[TokenMapping]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for mapping in mappings {
        if !seen.insert(mapping.token.as_str()) && !duplicates.contains(&mapping.token) {
            duplicates.push(mapping.token.clone());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_legacy_field_names() {
        let mapping: TokenMapping = serde_json::from_str(
            r#"{ "token": "SITE", "dataPath": "site.name", "defaultValue": "N/A" }"#,
        )
        .unwrap();
        assert_eq!(mapping, TokenMapping::new("SITE", "site.name", "N/A"));
    }

    #[test]
    fn default_is_optional() {
        let mapping: TokenMapping =
            serde_json::from_str(r#"{ "token": "SITE", "path": "site.name" }"#).unwrap();
        assert_eq!(mapping.default, "");
    }

    #[test]
    fn reports_each_duplicate_once() {
        let mappings = vec![
            TokenMapping::new("A", "a", ""),
            TokenMapping::new("B", "b", ""),
            TokenMapping::new("A", "c", ""),
            TokenMapping::new("A", "d", ""),
        ];
        assert_eq!(find_duplicate_tokens(&mappings), vec!["A".to_string()]);
    }
}
