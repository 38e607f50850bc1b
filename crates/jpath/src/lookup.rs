//! Typed traversal of a JSON value along a [`Path`].
use super::ast::{Path, PathSegment};
use crate::parser::parse_path;
use serde_json::{Map, Value};

/// The result of following a path. Absence is an ordinary outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Map(&'a Map<String, Value>),
    Seq(&'a [Value]),
    /// A string, number or boolean.
    Scalar(&'a Value),
    /// Missing key, wrong container type, index out of range, or `null`.
    Absent,
}

impl<'a> Lookup<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => Lookup::Absent,
            Value::Object(map) => Lookup::Map(map),
            Value::Array(items) => Lookup::Seq(items),
            scalar => Lookup::Scalar(scalar),
        }
    }

    /// Steps one segment further down.
    pub fn step(self, segment: &PathSegment) -> Lookup<'a> {
        match (self, segment) {
            (Lookup::Map(map), PathSegment::Key(key)) => {
                map.get(key).map(Lookup::of).unwrap_or(Lookup::Absent)
            }
            (Lookup::Map(map), PathSegment::Index(index)) => map
                .get(&index.to_string())
                .map(Lookup::of)
                .unwrap_or(Lookup::Absent),
            (Lookup::Seq(items), PathSegment::Key(key)) => match key.parse::<usize>() {
                Ok(index) => items.get(index).map(Lookup::of).unwrap_or(Lookup::Absent),
                Err(_) => Lookup::Absent,
            },
            (Lookup::Seq(items), PathSegment::Index(index)) => {
                items.get(*index).map(Lookup::of).unwrap_or(Lookup::Absent)
            }
            (Lookup::Scalar(_), _) | (Lookup::Absent, _) => Lookup::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    /// Canonical string form of a scalar. Containers and absence yield `None`.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Lookup::Scalar(Value::String(s)) => Some(s.clone()),
            Lookup::Scalar(Value::Number(n)) => Some(n.to_string()),
            Lookup::Scalar(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }

    /// The underlying JSON value, if any.
    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Lookup::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

/// Follows a parsed path from `root`.
pub fn lookup<'a>(root: &'a Value, path: &Path) -> Lookup<'a> {
    path.segments()
        .iter()
        .fold(Lookup::of(root), |current, segment| current.step(segment))
}

/// Follows a textual path from `root`. Unparsable paths are absent.
pub fn lookup_str<'a>(root: &'a Value, path: &str) -> Lookup<'a> {
    match parse_path(path) {
        Ok(parsed) => lookup(root, &parsed),
        Err(_) => Lookup::Absent,
    }
}

/// Resolves `path` against `root` to a scalar's string form, or `default`.
///
/// Never fails: absent segments, containers, `null` and malformed paths all
/// short-circuit to `default`. No locale formatting is applied.
pub fn resolve(root: &Value, path: &str, default: &str) -> String {
    lookup_str(root, path)
        .as_string()
        .unwrap_or_else(|| default.to_string())
}

/// Selects the raw value at `path`, containers included.
pub fn select<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let parsed = parse_path(path).ok()?;
    let mut current = root;
    for segment in parsed.segments() {
        current = match (current, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map.get(key)?,
            (Value::Object(map), PathSegment::Index(index)) => map.get(&index.to_string())?,
            (Value::Array(items), PathSegment::Key(key)) => items.get(key.parse::<usize>().ok()?)?,
            (Value::Array(items), PathSegment::Index(index)) => items.get(*index)?,
            _ => return None,
        };
    }
    if current.is_null() { None } else { Some(current) }
}
