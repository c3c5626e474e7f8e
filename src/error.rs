//! Error taxonomy shared by the fetchers, the cache, the streaming layer and
//! the prediction pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A request needs a credential that is not configured. Never retried.
    #[error("credential missing: {0}")]
    CredentialMissing(&'static str),

    /// Transport failure or non-success status from an upstream API.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    #[error("stream disconnected: {0}")]
    StreamDisconnected(String),
}

impl Error {
    pub fn upstream(message: impl Into<String>) -> Self {
        Error::UpstreamUnavailable(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedUpstreamResponse(message.into())
    }
}

// Request URLs can carry credentials, so they never reach the message.
impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        let error = error.without_url();
        if error.is_decode() {
            Error::MalformedUpstreamResponse(error.to_string())
        } else {
            Error::UpstreamUnavailable(error.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::MalformedUpstreamResponse(error.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::StreamDisconnected(error.to_string())
    }
}
