use std::path::{Path, PathBuf};

use registrar_client::RegistrarClient;
use registrar_core::config::AppConfig;
use registrar_core::wizard::RegistrationWizard;
use registrar_core::ApplicationError;
use serde_json::json;
use tracing::info;

use crate::commands::form::{load_documents, load_form, registration_data};
use crate::commands::{open_session, to_details, CommandResult};

const COMMAND: &str = "register";

#[derive(Clone, Debug, Default)]
pub struct RegisterArgs {
    pub form: PathBuf,
    pub documents: Vec<PathBuf>,
    pub accept_terms: bool,
}

/// Walks the wizard through every step and submits once.
pub async fn run(config: &AppConfig, args: &RegisterArgs) -> CommandResult {
    let mut wizard = match prepare_wizard(&args.form, &args.documents, args.accept_terms) {
        Ok(wizard) => wizard,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    while !wizard.current_step().is_last() {
        if let Err(error) = wizard.next_step() {
            let step = error.step().number();
            let error = ApplicationError::from(error);
            return CommandResult::failure_with_details(
                COMMAND,
                error.error_class(),
                error.to_string(),
                error.exit_code(),
                Some(json!({ "step": step, "errors": error.form_errors() })),
            );
        }
    }

    let session = match open_session(config) {
        Ok(session) => session,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };
    let client = match RegistrarClient::new(&config.api) {
        Ok(client) => client,
        Err(error) => return CommandResult::from_client_error(COMMAND, &error),
    };

    match wizard.submit_registration(&client, &session).await {
        Ok(receipt) => {
            info!(
                event_name = "cli.register_completed",
                correlation_id = %receipt.correlation_id,
                "registration completed"
            );
            let message = receipt
                .message
                .clone()
                .unwrap_or_else(|| "Registration Successful!".to_string());
            CommandResult::success_with_details(COMMAND, message, to_details(&receipt))
        }
        Err(error) => {
            let error = ApplicationError::from(error);
            CommandResult::failure_with_details(
                COMMAND,
                error.error_class(),
                error.to_string(),
                error.exit_code(),
                Some(json!({ "errors": wizard.errors() })),
            )
        }
    }
}

fn prepare_wizard(
    form_path: &Path,
    document_paths: &[PathBuf],
    accept_terms: bool,
) -> Result<RegistrationWizard, ApplicationError> {
    let form = load_form(form_path)?;
    let documents = load_documents(document_paths)?;
    let mut data = registration_data(form, documents);
    data.terms_accepted |= accept_terms;
    Ok(RegistrationWizard::with_data(data))
}
