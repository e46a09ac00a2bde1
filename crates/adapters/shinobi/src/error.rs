//! Transport error types.

use std::time::Duration;

use pressgate_domain::error::DispatchError;

/// Errors specific to the Shinobi transport.
#[derive(Debug, thiserror::Error)]
pub enum ShinobiError {
    /// The configured base URL does not parse.
    #[error("invalid base URL `{url}`")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("base URL `{0}` cannot be used as a base")]
    CannotBeABase(String),

    /// The motion payload could not be encoded.
    #[error("failed to encode motion payload")]
    Payload(#[from] serde_json::Error),

    /// The HTTP client failed (build, connect, timeout, protocol).
    #[error("HTTP client error")]
    Client(#[from] reqwest::Error),
}

impl ShinobiError {
    /// Classify into a [`DispatchError`]; `timeout` is reported for timeouts.
    #[must_use]
    pub fn into_dispatch(self, timeout: Duration) -> DispatchError {
        match self {
            Self::Client(err) if err.is_timeout() => DispatchError::Timeout(timeout),
            Self::Client(err) => DispatchError::Transport(Box::new(err)),
            other => DispatchError::InvalidRequest(Box::new(other)),
        }
    }
}
