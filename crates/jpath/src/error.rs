use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JPathError {
    #[error("Path parse error in '{0}': {1}")]
    Parse(String, String),
}
