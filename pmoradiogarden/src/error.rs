//! Error types for the Radio Garden client

/// Result type alias for Radio Garden operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when resolving or storing Radio Garden stations
///
/// Every variant carries a message meant to be shown to the user as is.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (connection, timeout, TLS...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an unexpected status
    #[error("API error: {0}")]
    ApiError(String),

    /// Response body does not match the expected structure
    #[error("Invalid response from Radio Garden: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The pasted URL matches none of the known shapes
    #[error("{0}")]
    Unrecognized(String),

    /// A place page listed no channel
    #[error("{0}")]
    EmptyPlace(String),

    /// A channel id could not be read from a place item
    #[error("Could not parse channel ID from: {0}")]
    Extraction(String),

    /// Station database failure
    #[error("Station store error: {0}")]
    Store(String),

    /// Configuration error (from pmoconfig/anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an API error
    pub fn api_error(msg: impl Into<String>) -> Self {
        Self::ApiError(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// The error raised for input that is neither a directory link nor a stream
    pub fn unrecognized() -> Self {
        Self::Unrecognized(
            "Could not parse URL. Paste a radio.garden link or a direct stream URL.".to_string(),
        )
    }

    /// The error raised when a place resolves to zero channels
    pub fn empty_place() -> Self {
        Self::EmptyPlace("No channels found at this location".to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.to_string())
    }
}
