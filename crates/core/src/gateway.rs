use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::profile::{CompanyProfile, UserProfile};
use crate::submission::SubmissionPayload;

/// Fallback text for the `submit` error when nothing better is known.
pub const GENERIC_SUBMIT_FAILURE: &str = "Registration failed";

/// Body of a successful `POST /api/register`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationResponse {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub company: Option<CompanyProfile>,
    pub message: Option<String>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Non-2xx answer. `message` is the server's `error` field, or
    /// `HTTP <code>: <reason>` when the body had none.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("network failure: {0}")]
    Network(String),
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn from_status(status: u16, reason: Option<&str>, server_error: Option<String>) -> Self {
        let message = server_error.filter(|message| !message.trim().is_empty()).unwrap_or_else(
            || match reason {
                Some(reason) => format!("HTTP {status}: {reason}"),
                None => format!("HTTP {status}"),
            },
        );
        Self::Status { status, message }
    }

    /// Text shown in the submission banner.
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Status { message, .. } => message.as_str(),
            Self::Network(message) | Self::Decode(message) => message.as_str(),
        };
        if message.trim().is_empty() {
            GENERIC_SUBMIT_FAILURE.to_string()
        } else {
            message.to_string()
        }
    }
}

/// Carries an encoded registration to the remote API.
#[async_trait]
pub trait RegistrationGateway: Send + Sync {
    async fn register(
        &self,
        payload: SubmissionPayload,
    ) -> Result<RegistrationResponse, TransportError>;
}
