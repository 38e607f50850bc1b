//! Whole-template tag validation.
//!
//! The template engine stops at the first problem it meets. Validation walks every
//! `{{ ... }}` tag up front and collects all problems, so a template author sees
//! the complete list in one report.

use crate::runs::find_bytes;
use rapport_jpath::select;
use rapport_render_core::{BLOCK_HELPERS, KNOWN_HELPERS};
use serde_json::Value;

/// A located `{{ ... }}` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub raw: &'a str,
    /// Content between the delimiters, with triple-stash braces and `~` removed.
    pub inner: &'a str,
}

#[derive(Debug, PartialEq, Eq)]
enum TagKind<'a> {
    Comment,
    Open { helper: &'a str, args: &'a str },
    Close(&'a str),
    Else,
    Partial,
    Expression(&'a str),
}

fn classify(inner: &str) -> TagKind<'_> {
    if inner.starts_with('!') {
        return TagKind::Comment;
    }
    if inner == "else" || inner == "^" || inner.starts_with("else ") {
        return TagKind::Else;
    }
    if inner.starts_with('>') || inner.starts_with("#>") || inner.starts_with("#*") {
        return TagKind::Partial;
    }
    if let Some(rest) = inner.strip_prefix('#').or_else(|| inner.strip_prefix('^')) {
        let rest = rest.trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        return TagKind::Open {
            helper: &rest[..end],
            args: rest[end..].trim(),
        };
    }
    if let Some(rest) = inner.strip_prefix('/') {
        return TagKind::Close(rest.trim());
    }
    TagKind::Expression(inner)
}

/// Finds every tag in `text`. Problems with the delimiters themselves are returned
/// alongside.
pub fn scan_tags(text: &str) -> (Vec<Tag<'_>>, Vec<String>) {
    let bytes = text.as_bytes();
    let mut tags = Vec::new();
    let mut problems = Vec::new();
    let mut i = 0;
    while let Some(rel) = find_bytes(&bytes[i..], b"{{") {
        let start = i + rel;
        if start > 0 && bytes[start - 1] == b'\\' {
            i = start + 2;
            continue;
        }
        let triple = bytes[start..].starts_with(b"{{{");
        let open_len = if triple { 3 } else { 2 };
        let closer: &[u8] = if triple { b"}}}" } else { b"}}" };
        let body_start = start + open_len;
        let close = find_bytes(&bytes[body_start..], closer).map(|r| body_start + r);
        let reopen = find_bytes(&bytes[body_start..], b"{{").map(|r| body_start + r);
        match (close, reopen) {
            (Some(end), Some(next)) if next < end => {
                problems.push(format!("malformed tag '{}'", snippet(&text[start..next])));
                i = next;
            }
            (Some(end), _) => {
                let raw = &text[start..end + closer.len()];
                let inner = text[body_start..end].trim_matches('~').trim();
                tags.push(Tag { raw, inner });
                i = end + closer.len();
            }
            (None, _) => {
                problems.push(format!("unterminated tag '{}'", snippet(&text[start..])));
                break;
            }
        }
    }
    (tags, problems)
}

fn snippet(text: &str) -> String {
    const MAX: usize = 40;
    match text.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Splits helper arguments on top-level whitespace, honouring quotes and parentheses.
fn split_args(text: &str) -> Result<Vec<&str>, String> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                start.get_or_insert(i);
            }
            '(' => {
                depth += 1;
                start.get_or_insert(i);
            }
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unbalanced ')' in '{text}'"))?;
            }
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    args.push(&text[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if quote.is_some() {
        return Err(format!("unterminated string in '{text}'"));
    }
    if depth > 0 {
        return Err(format!("unbalanced '(' in '{text}'"));
    }
    if let Some(s) = start {
        args.push(&text[s..]);
    }
    Ok(args)
}

/// Checks helper names inside subexpressions and hash values.
fn check_args(args: &[&str], problems: &mut Vec<String>) {
    for arg in args {
        let value = match arg.split_once('=') {
            Some((key, value)) if !key.contains(['(', '"', '\'']) => value,
            _ => arg,
        };
        if let Some(sub) = value.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            check_call(sub.trim(), problems);
        }
    }
}

fn check_call(call: &str, problems: &mut Vec<String>) {
    match split_args(call) {
        Ok(parts) => match parts.split_first() {
            Some((helper, rest)) => {
                if !KNOWN_HELPERS.contains(helper) {
                    problems.push(format!("unknown helper '{helper}'"));
                }
                check_args(rest, problems);
            }
            None => problems.push("empty subexpression '()'".to_string()),
        },
        Err(message) => problems.push(message),
    }
}

/// A plain data path (as opposed to a literal, subexpression or context keyword).
fn data_path(arg: &str) -> Option<String> {
    let is_path = !arg.is_empty()
        && !arg.starts_with(['@', '.', '(', '"', '\''])
        && !arg.starts_with("this")
        && !arg.chars().next().is_some_and(|c| c.is_ascii_digit())
        && arg != "true"
        && arg != "false"
        && arg != "null"
        && arg
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '[' | ']'));
    is_path.then(|| arg.replace('/', "."))
}

/// Validates every tag in one template part against `view`.
///
/// Reports unbalanced and stray blocks, unknown helpers, malformed tags, and
/// top-level `#each` / `#with` targets that are absent from the data.
pub fn validate_template(text: &str, view: &Value) -> Vec<String> {
    let (tags, mut problems) = scan_tags(text);
    let mut open_blocks: Vec<(&str, &str)> = Vec::new();

    for tag in &tags {
        if tag.inner.is_empty() {
            problems.push(format!("empty tag '{}'", tag.raw));
            continue;
        }
        match classify(tag.inner) {
            TagKind::Comment => {}
            TagKind::Partial => problems.push(format!("partials are not supported: '{}'", tag.raw)),
            TagKind::Else => {
                if open_blocks.is_empty() {
                    problems.push(format!("'{}' outside of a block", tag.raw));
                }
            }
            TagKind::Open { helper, args } => {
                if !BLOCK_HELPERS.contains(&helper) {
                    problems.push(format!("unknown block helper '#{helper}' in '{}'", tag.raw));
                }
                match split_args(args) {
                    Ok(parts) => {
                        if parts.is_empty() {
                            problems.push(format!("block '{}' has no argument", tag.raw));
                        }
                        check_args(&parts, &mut problems);
                        if open_blocks.is_empty()
                            && matches!(helper, "each" | "with")
                            && let Some(path) = parts.first().and_then(|p| data_path(p))
                            && select(view, &path).is_none()
                        {
                            problems.push(format!("'{}': '{}' is not in the data", tag.raw, path));
                        }
                    }
                    Err(message) => problems.push(message),
                }
                open_blocks.push((helper, tag.raw));
            }
            TagKind::Close(name) => match open_blocks.pop() {
                Some((open, _)) if open == name => {}
                Some((_, open_raw)) => {
                    problems.push(format!("'{}' does not close '{}'", tag.raw, open_raw));
                }
                None => problems.push(format!("stray closing tag '{}'", tag.raw)),
            },
            TagKind::Expression(expr) => match split_args(expr) {
                Ok(parts) => {
                    if parts.len() > 1 && !KNOWN_HELPERS.contains(&parts[0]) {
                        problems.push(format!("unknown helper '{}' in '{}'", parts[0], tag.raw));
                    }
                    check_args(&parts, &mut problems);
                }
                Err(message) => problems.push(message),
            },
        }
    }

    for (_, raw) in open_blocks {
        problems.push(format!("unclosed block '{raw}'"));
    }
    problems
}
