use thiserror::Error;

pub type Result<T> = std::result::Result<T, PremonitionError>;

#[derive(Debug, Error)]
pub enum PremonitionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("Failed to parse oracle response: {0}")]
    Parse(String),

    #[error("Invalid document template: expected exactly one `{marker}` marker, found {found}")]
    InvalidTemplate { marker: &'static str, found: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No `undefinedField` diagnostic carried the container type name for document: {document}")]
    MissingContainerTypename { document: String },

    #[error("Invalid schema snapshot: {0}")]
    Snapshot(String),
}
