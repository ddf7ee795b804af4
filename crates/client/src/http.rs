use async_trait::async_trait;
use registrar_core::config::ApiConfig;
use registrar_core::gateway::{RegistrationGateway, RegistrationResponse, TransportError};
use registrar_core::submission::SubmissionPayload;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::ClientError;

pub(crate) const REGISTER_PATH: &str = "api/register";
pub(crate) const LOGIN_PATH: &str = "api/login";
pub(crate) const PROFILE_PATH: &str = "api/profile";
pub(crate) const COMPANIES_PATH: &str = "api/companies";
pub(crate) const HEALTH_PATH: &str = "health";

/// Error body shape shared by every endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: Option<String>,
}

/// Thin typed wrapper over one `reqwest::Client` and the API base URL.
#[derive(Clone, Debug)]
pub struct RegistrarClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RegistrarClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let base_url = config.parsed_base_url()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ClientError::Init)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` below the base URL, keeping any base path prefix.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|source| ClientError::Endpoint { path: path.to_string(), source })
    }

    pub(crate) fn get(&self, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.get(self.endpoint(path)?))
    }

    pub(crate) fn post(&self, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.post(self.endpoint(path)?))
    }

    pub(crate) fn put(&self, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.put(self.endpoint(path)?))
    }

    /// Sends the request and decodes a 2xx JSON body into `T`.
    pub(crate) async fn send_json<T>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Http { endpoint: endpoint.to_string(), source })?;
        let response = ensure_success(endpoint, response).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| ClientError::Decode { endpoint: endpoint.to_string(), source })
    }

    /// Builds the multipart body for `POST /api/register`.
    pub fn registration_form(payload: SubmissionPayload) -> Result<Form, ClientError> {
        let (fields, documents) = payload.into_parts();
        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name, value);
        }
        for document in documents {
            let file_name = document.file_name.clone();
            let part = Part::bytes(document.content)
                .file_name(document.file_name)
                .mime_str(&document.content_type)
                .map_err(|source| ClientError::Attachment { file_name, source })?;
            form = form.part(document.name, part);
        }
        Ok(form)
    }

    pub async fn register(
        &self,
        payload: SubmissionPayload,
    ) -> Result<RegistrationResponse, ClientError> {
        let endpoint = "POST /api/register";
        debug!(
            event_name = "client.register_sending",
            documents = payload.documents().len(),
            "sending registration"
        );
        let form = Self::registration_form(payload)?;
        let request = self.post(REGISTER_PATH)?.multipart(form);
        self.send_json(endpoint, request).await
    }
}

#[async_trait]
impl RegistrationGateway for RegistrarClient {
    async fn register(
        &self,
        payload: SubmissionPayload,
    ) -> Result<RegistrationResponse, TransportError> {
        RegistrarClient::register(self, payload).await.map_err(ClientError::into_transport)
    }
}

/// Passes 2xx responses through; anything else becomes
/// [`ClientError::Api`] with the server's `error` text or
/// `HTTP <code>: <reason>`.
pub(crate) async fn ensure_success(
    endpoint: &str,
    response: Response,
) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let server_error = serde_json::from_str::<ErrorBody>(&body).ok().and_then(|body| body.error);
    let message =
        match TransportError::from_status(status.as_u16(), status.canonical_reason(), server_error)
        {
            TransportError::Status { message, .. } => message,
            other => other.to_string(),
        };

    warn!(
        event_name = "client.request_failed",
        endpoint,
        status = status.as_u16(),
        message = %message,
        "API request failed"
    );
    Err(ClientError::Api { endpoint: endpoint.to_string(), status: status.as_u16(), message })
}
