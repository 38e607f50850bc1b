//! Shared data model for the rapport rendering workspace.
//!
//! - [`Record`]: one inspection report as it arrives from storage, in either the
//!   legacy list shape or the keyed shape for its checklist sections
//! - [`NormalizedRecord`]: the same record after legacy migration, keyed only
//! - [`SectionKind`] and its catalog of expected checklist entries
//! - [`TokenMapping`]: operator-defined token overrides
//! - [`PageSize`] / [`Margins`]: page geometry for paginated output

pub mod catalog;
pub mod geometry;
pub mod mapping;
pub mod record;

pub use catalog::{CatalogEntry, SectionKind};
pub use geometry::{Margins, PageSize, Size};
pub use mapping::{TokenMapping, find_duplicate_tokens};
pub use record::{
    ChecklistItem, EMPTY_MARKER, KeyedSection, LegacyItem, NormalizedRecord, Record, Section,
};
