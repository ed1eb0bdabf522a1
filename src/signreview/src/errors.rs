use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("Format not available for this request: {0}")]
    FormatUnavailable(String),
    #[error("Unknown format key: {0}")]
    UnknownFormatKey(String),
}
