use registrar_core::{ConfigError, SessionError, TransportError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not build HTTP client: {0}")]
    Init(#[source] reqwest::Error),
    #[error("invalid endpoint path `{path}`: {source}")]
    Endpoint { path: String, source: url::ParseError },
    #[error("document `{file_name}` has an unusable content type: {source}")]
    Attachment { file_name: String, source: reqwest::Error },
    #[error("request to {endpoint} failed: {source}")]
    Http { endpoint: String, source: reqwest::Error },
    /// Non-2xx answer; `message` follows the API's `error` field.
    #[error("{message}")]
    Api { endpoint: String, status: u16, message: String },
    #[error("could not decode response from {endpoint}: {source}")]
    Decode { endpoint: String, source: reqwest::Error },
    #[error("No authentication token available")]
    NotAuthenticated,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Collapses the error into what the registration wizard understands.
    pub fn into_transport(self) -> TransportError {
        match self {
            Self::Api { status, message, .. } => TransportError::Status { status, message },
            Self::Decode { source, .. } => TransportError::Decode(source.to_string()),
            other => TransportError::Network(other.to_string()),
        }
    }
}
