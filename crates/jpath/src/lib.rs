//! Dot-delimited path lookup over JSON values.
//!
//! Paths such as `site.address.city` or `observations.0.description` are parsed
//! once and then followed through a value as a [`Lookup`], a tagged view that
//! makes absence an ordinary variant rather than an error. [`resolve`] is the
//! string-producing entry point used for token values.

pub mod ast;
pub mod error;
pub mod lookup;
mod parser;

// --- Public API ---
pub use ast::{Path, PathSegment};
pub use error::JPathError;
pub use lookup::{Lookup, lookup, lookup_str, resolve, select};
pub use parser::parse_path;
