//! Run consolidation.
//!
//! Word splits paragraph text into `<w:r><w:t>` runs wherever formatting,
//! spell-check or editing history changes, so a tag typed as `{{site.name}}` can
//! arrive as `{{site.` + `name}}`. Before merging, every `{{ ... }}` tag and every
//! `[TOKEN]` that crosses a run boundary is moved wholly into the run where it
//! starts. Only text content changes; run properties and markup are untouched.

use quick_xml::escape::unescape;
use rapport_render_core::RenderError;
use roxmltree::{Document, Node};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Range;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
const PRESERVE_ATTR: &str = r#" xml:space="preserve""#;

/// The raw byte layout of one `<w:t>` element in the source.
#[derive(Debug)]
struct TextRun {
    /// Offset of the `>` that ends the start tag.
    start_tag_end: usize,
    content: Range<usize>,
    preserves_space: bool,
}

fn is_w(node: &Node, local: &str) -> bool {
    node.is_element() && node.tag_name().name() == local && node.tag_name().namespace() == Some(W_NS)
}

fn text_run(xml: &str, node: &Node) -> Option<TextRun> {
    let range = node.range();
    let element = &xml[range.clone()];
    if element.ends_with("/>") {
        return None;
    }
    let open_end = element.find('>')?;
    let close_start = element.rfind("</")?;
    if close_start <= open_end {
        return None;
    }
    Some(TextRun {
        start_tag_end: range.start + open_end,
        content: range.start + open_end + 1..range.start + close_start,
        preserves_space: node.attribute((XML_NS, "space")) == Some("preserve"),
    })
}

/// Byte ranges of merge tags and literal tokens in `text`, in order, non-overlapping.
///
/// An unterminated `{{` is not a span; the tag validator reports it.
pub(crate) fn tag_spans(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"{{") {
            let closer: &[u8] = if bytes[i..].starts_with(b"{{{") { b"}}}" } else { b"}}" };
            match find_bytes(&bytes[i + 2..], closer) {
                Some(rel) => {
                    let end = i + 2 + rel + closer.len();
                    spans.push(i..end);
                    i = end;
                }
                None => i += 2,
            }
        } else if bytes[i] == b'[' {
            let mut j = i + 1;
            while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                j += 1;
            }
            if j > i + 1 && j < bytes.len() && bytes[j] == b']' {
                spans.push(i..j + 1);
                i = j + 1;
            } else {
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    spans
}

pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Undoes XML escaping and typographic quotes inside merge tags, which Word
/// applies to text but which the template language cannot parse.
fn clean_tag_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in tag_spans(text) {
        if !text[span.clone()].starts_with("{{") {
            continue;
        }
        out.push_str(&text[last..span.start]);
        let raw = &text[span.clone()];
        let tag = match unescape(raw) {
            Ok(tag) => tag,
            Err(e) => {
                log::debug!("Leaving merge tag '{}' escaped: {}", raw, e);
                Cow::Borrowed(raw)
            }
        };
        let tag = tag
            .replace(['\u{201C}', '\u{201D}'], "\"")
            .replace(['\u{2018}', '\u{2019}'], "'");
        out.push_str(&tag);
        last = span.end;
    }
    out.push_str(&text[last..]);
    out
}

fn paragraph_edits(xml: &str, runs: &[TextRun]) -> Vec<(Range<usize>, String)> {
    let mut joined = String::new();
    let mut bounds = Vec::with_capacity(runs.len() + 1);
    for run in runs {
        bounds.push(joined.len());
        joined.push_str(&xml[run.content.clone()]);
    }
    bounds.push(joined.len());

    let spans = tag_spans(&joined);
    // A boundary that falls inside a span moves to the span's end, so the run
    // holding the span's first character takes all of it.
    let moved: Vec<usize> = bounds
        .iter()
        .map(|&b| {
            spans
                .iter()
                .find(|span| span.start < b && b < span.end)
                .map_or(b, |span| span.end)
        })
        .collect();

    let mut edits = Vec::new();
    for (i, run) in runs.iter().enumerate() {
        let original = &xml[run.content.clone()];
        let updated = clean_tag_text(&joined[moved[i]..moved[i + 1]]);
        if updated == original {
            continue;
        }
        if !run.preserves_space {
            edits.push((run.start_tag_end..run.start_tag_end, PRESERVE_ATTR.to_string()));
        }
        edits.push((run.content.clone(), updated));
    }
    edits
}

/// Rewrites `xml` so no tag or token spans more than one text run.
pub fn consolidate_runs(xml: &str) -> Result<String, RenderError> {
    let document = Document::parse(xml)
        .map_err(|e| RenderError::Package(format!("part is not well-formed XML: {e}")))?;

    // Keyed by paragraph start offset; runs stay in document order.
    let mut paragraphs: BTreeMap<usize, Vec<TextRun>> = BTreeMap::new();
    for node in document.descendants().filter(|n| is_w(n, "t")) {
        let Some(paragraph) = node.ancestors().skip(1).find(|n| is_w(n, "p")) else {
            continue;
        };
        if let Some(run) = text_run(xml, &node) {
            paragraphs.entry(paragraph.range().start).or_default().push(run);
        }
    }

    let mut edits: Vec<(Range<usize>, String)> = paragraphs
        .values()
        .flat_map(|runs| paragraph_edits(xml, runs))
        .collect();
    if edits.is_empty() {
        return Ok(xml.to_string());
    }
    log::debug!("[PACKAGE] Consolidating {} text edits", edits.len());

    edits.sort_by_key(|(range, _)| range.start);
    let mut out = xml.to_string();
    for (range, replacement) in edits.into_iter().rev() {
        out.replace_range(range, &replacement);
    }
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn wrap_body(paragraphs: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{paragraphs}</w:body></w:document>"#
        )
    }

    /// All text content of the document's runs, one string per paragraph.
    pub fn paragraph_texts(xml: &str) -> Vec<Vec<String>> {
        let document = Document::parse(xml).unwrap();
        document
            .descendants()
            .filter(|n| is_w(n, "p"))
            .map(|p| {
                p.descendants()
                    .filter(|n| is_w(n, "t"))
                    .map(|t| t.text().unwrap_or("").to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn spans_find_tags_and_tokens() {
        let text = "a {{x}} [TOK] [not a token] {{{raw}}} [] {{open";
        let found: Vec<&str> = tag_spans(text).into_iter().map(|r| &text[r]).collect();
        assert_eq!(found, ["{{x}}", "[TOK]", "{{{raw}}}"]);
    }

    #[test]
    fn split_tag_moves_into_first_run() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>Site: {{site.</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>name}} ok</w:t></w:r></w:p>"#,
        );
        let out = consolidate_runs(&xml).unwrap();
        assert_eq!(paragraph_texts(&out), vec![vec!["Site: {{site.name}}", " ok"]]);
        assert!(out.contains(r#"<w:t xml:space="preserve"> ok</w:t>"#));
        assert!(out.contains("<w:b/>"));
    }

    #[test]
    fn token_split_over_three_runs() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>[</w:t></w:r><w:r><w:t>SITE_</w:t></w:r><w:r><w:t>NAME] end</w:t></w:r></w:p>"#,
        );
        let out = consolidate_runs(&xml).unwrap();
        assert_eq!(paragraph_texts(&out), vec![vec!["[SITE_NAME]", "", " end"]]);
    }

    #[test]
    fn paragraphs_are_independent() {
        let xml = wrap_body(r#"<w:p><w:r><w:t>{{a</w:t></w:r></w:p><w:p><w:r><w:t>}}</w:t></w:r></w:p>"#);
        let out = consolidate_runs(&xml).unwrap();
        assert_eq!(out, xml);
    }

    #[test]
    fn whole_tags_are_left_alone() {
        let xml = wrap_body(r#"<w:p><w:r><w:t>{{a}}</w:t></w:r><w:r><w:t xml:space="preserve"> [B]</w:t></w:r></w:p>"#);
        assert_eq!(consolidate_runs(&xml).unwrap(), xml);
    }

    #[test]
    fn escaped_quotes_inside_tags_are_restored() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>{{#if (eq status &quot;OK&quot;)}}</w:t></w:r><w:r><w:t>{{/if}} “x”</w:t></w:r></w:p>"#,
        );
        let out = consolidate_runs(&xml).unwrap();
        assert!(out.contains(r#"{{#if (eq status "OK")}}"#));
        assert!(out.contains("“x”"));
    }

    #[test]
    fn character_references_inside_tags_are_restored() {
        let xml = wrap_body(
            r#"<w:p><w:r><w:t>{{default site.name &#34;n/a&#34;}} {{default engineer.name &#x201C;-&#x201D;}} &#34;kept&#34;</w:t></w:r></w:p>"#,
        );
        let out = consolidate_runs(&xml).unwrap();
        assert!(out.contains(r#"{{default site.name "n/a"}}"#), "{out}");
        assert!(out.contains(r#"{{default engineer.name "-"}}"#), "{out}");
        assert!(out.contains("&#34;kept&#34;"), "{out}");
    }

    #[test]
    fn ampersands_inside_tags_are_restored() {
        let xml = wrap_body(r#"<w:p><w:r><w:t>{{a}}&amp;{{b &amp; c}}</w:t></w:r></w:p>"#);
        let out = consolidate_runs(&xml).unwrap();
        assert!(out.contains("{{b & c}}"), "{out}");
    }

    #[test]
    fn self_closing_text_is_skipped() {
        let xml = wrap_body(r#"<w:p><w:r><w:t/></w:r><w:r><w:t>{{a}}</w:t></w:r></w:p>"#);
        assert_eq!(consolidate_runs(&xml).unwrap(), xml);
    }

    #[test]
    fn malformed_xml_is_a_package_error() {
        assert!(matches!(consolidate_runs("<w:document>"), Err(RenderError::Package(_))));
    }
}
