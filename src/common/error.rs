use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No `TAG` marker where a tag was expected. This is a normal condition
    /// on untagged files, not a corruption error.
    #[error("id3v1 tag was not found")]
    TagNotFound,

    #[error("format error: {0}")]
    Format(String),

    #[error("value error: {0}")]
    ValueError(String),
}

impl MetaError {
    /// True for conditions the caller may recover from by continuing with
    /// an empty tag.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MetaError::TagNotFound)
    }
}

pub type Result<T> = std::result::Result<T, MetaError>;
