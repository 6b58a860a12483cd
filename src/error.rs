use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubtitleError {
    #[error("invalid time value: {0} (must be finite and non-negative)")]
    InvalidTime(f64),
    #[error("{0}")]
    ParseError(String),
    #[error("malformed document: {0}")]
    FormatError(String),
    #[error("index {index} is out of range for a timeline of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no live entry matches {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, SubtitleError>;

impl SubtitleError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        SubtitleError::FormatError(msg.into())
    }
}
