//! Parsed form of a dot-delimited path.

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A dotted segment (`.name` or `.3`). Digits index into sequences and are
    /// tried as a plain key on maps.
    Key(String),
    /// A bracketed index (`[0]`).
    Index(usize),
}

/// A sequence of segments. The empty path selects the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(pub Vec<PathSegment>);

impl Path {
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}
