//! Escaping of values written into WordprocessingML text runs.

/// Closes the current text element, emits a line break, and reopens text in the same run.
pub const LINE_BREAK: &str = r#"</w:t><w:br/><w:t xml:space="preserve">"#;

pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// [`xml_escape`] plus newline handling: each `\n` (or `\r\n`) becomes a `<w:br/>`.
pub fn xml_escape_with_breaks(text: &str) -> String {
    xml_escape(&text.replace("\r\n", "\n")).replace('\n', LINE_BREAK)
}
