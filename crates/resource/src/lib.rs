//! Template stores for the rapport pipeline.
//!
//! - [`FilesystemTemplateStore`]: templates as files in one directory
//!
//! The in-memory store from rapport-traits is re-exported for convenience.

mod filesystem;

pub use filesystem::FilesystemTemplateStore;

pub use rapport_traits::InMemoryTemplateStore;
