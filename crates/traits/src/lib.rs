pub mod store;
pub mod template;

pub use store::{InMemoryTemplateStore, SharedTemplateData, StoreError, TemplateInfo, TemplateStore};
pub use template::{TemplateKind, template_file_name, validate_name};
