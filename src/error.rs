//! Error types

use thiserror::Error;

/// Failure while fetching suggestions from the remote API.
///
/// These never reach the user: the fetcher logs them and degrades to an
/// empty suggestion list.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

/// Failure while reading or writing persisted recent searches.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt stored value for {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}
