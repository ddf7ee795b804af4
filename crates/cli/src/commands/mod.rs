pub mod companies;
pub mod config;
pub mod form;
pub mod health;
pub mod login;
pub mod logout;
pub mod profile;
pub mod register;
pub mod status;
pub mod validate;

use std::future::Future;
use std::sync::Arc;

use registrar_client::{AuthService, ClientError, RegistrarClient};
use registrar_core::config::AppConfig;
use registrar_core::session::{FileSessionStore, SessionContext};
use registrar_core::ApplicationError;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_details(command, message, None)
    }

    pub fn success_with_details(
        command: &str,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            details,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::failure_with_details(command, error_class, message, exit_code, None)
    }

    pub fn failure_with_details(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
        details: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            details,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Field errors, when the failure has any, land in `details.errors`.
    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        let details = error.form_errors().map(|errors| json!({ "errors": errors }));
        Self::failure_with_details(
            command,
            error.error_class(),
            error.to_string(),
            error.exit_code(),
            details,
        )
    }

    pub fn from_client_error(command: &str, error: &ClientError) -> Self {
        let (error_class, exit_code) = match error {
            ClientError::Config(_) => ("config_validation", 2),
            ClientError::NotAuthenticated => ("auth_required", 7),
            ClientError::Session(_) => ("session", 6),
            ClientError::Init(_)
            | ClientError::Endpoint { .. }
            | ClientError::Attachment { .. }
            | ClientError::Http { .. }
            | ClientError::Api { .. }
            | ClientError::Decode { .. } => ("remote", 5),
        };
        let details = error.status().map(|status| json!({ "status": status }));
        Self::failure_with_details(command, error_class, error.to_string(), exit_code, details)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Runs an async command body on a fresh current-thread runtime.
pub fn block_on<F>(command: &str, future: F) -> CommandResult
where
    F: Future<Output = CommandResult>,
{
    match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime.block_on(future),
        Err(error) => CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            8,
        ),
    }
}

pub(crate) fn open_session(config: &AppConfig) -> Result<Arc<SessionContext>, ApplicationError> {
    let store = FileSessionStore::new(&config.session.store_path);
    Ok(Arc::new(SessionContext::init(Arc::new(store))?))
}

pub(crate) fn auth_service(command: &str, config: &AppConfig) -> Result<AuthService, CommandResult> {
    let session =
        open_session(config).map_err(|error| CommandResult::from_error(command, &error))?;
    let client = RegistrarClient::new(&config.api)
        .map_err(|error| CommandResult::from_client_error(command, &error))?;
    Ok(AuthService::new(client, session))
}

pub(crate) fn to_details<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}
