//! Pass 2: bracketed literal tokens.
use crate::escape::xml_escape_with_breaks;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([A-Za-z0-9_]+)\]").expect("BUG: invalid TOKEN_PATTERN regex literal")
});

/// Replaces every `[NAME]` whose name is in `tokens`. Unmapped tokens stay verbatim.
pub fn sweep_tokens(xml: &str, tokens: &BTreeMap<String, String>) -> String {
    let mut unmapped: Vec<String> = Vec::new();
    let swept = TOKEN_PATTERN.replace_all(xml, |caps: &Captures| match tokens.get(&caps[1]) {
        Some(value) => xml_escape_with_breaks(value),
        None => {
            unmapped.push(caps[1].to_string());
            caps[0].to_string()
        }
    });
    if !unmapped.is_empty() {
        log::debug!("[PACKAGE] Unmapped literal tokens left in place: {:?}", unmapped);
    }
    swept.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::LINE_BREAK;

    fn tokens(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn mapped_replaced_unmapped_kept() {
        let out = sweep_tokens("<w:t>[FOO] and [BAZ]</w:t>", &tokens(&[("FOO", "bar")]));
        assert_eq!(out, "<w:t>bar and [BAZ]</w:t>");
    }

    #[test]
    fn values_are_escaped_and_broken() {
        let out = sweep_tokens("[A]", &tokens(&[("A", "x < y\nz")]));
        assert_eq!(out, format!("x &lt; y{LINE_BREAK}z"));
    }

    #[test]
    fn only_word_characters_form_tokens() {
        let map = tokens(&[("A B", "no"), ("A-B", "no")]);
        assert_eq!(sweep_tokens("[A B] [A-B] []", &map), "[A B] [A-B] []");
    }

    #[test]
    fn empty_value_removes_token() {
        assert_eq!(sweep_tokens("x[EMPTY]y", &tokens(&[("EMPTY", "")])), "xy");
    }
}
