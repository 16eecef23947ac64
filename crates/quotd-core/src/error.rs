use thiserror::Error;

/// All the ways quote retrieval can go wrong
///
/// Repository operations return these instead of panicking; the controller
/// shows the `Display` text to the user as-is.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Empty response from quote server")]
    EmptyResponse,

    #[error("Malformed response from quote server: {0}")]
    MalformedResponse(String),

    #[error("Failed to refresh quote cache: {0}")]
    RefreshFailed(String),

    #[error("No previous quote available")]
    NoPreviousQuote,

    #[error("No quote found at position {0}")]
    NotFound(i64),

    #[error("Failed to retrieve previous quote at position {0}")]
    ReadFailed(i64),

    #[error("Cache operation failed: {0}")]
    CacheError(#[from] quotd_cache::CacheError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<quotd_api::QuoteApiError> for Error {
    fn from(err: quotd_api::QuoteApiError) -> Self {
        match err {
            quotd_api::QuoteApiError::EmptyResponse => Error::EmptyResponse,
            quotd_api::QuoteApiError::ParseError(e) => Error::MalformedResponse(e.to_string()),
            other => Error::NetworkError(other.to_string()),
        }
    }
}
