use std::path::{Path, PathBuf};

use registrar_core::errors::SubmitError;
use registrar_core::form::FieldKey;
use registrar_core::validation::validate_registration;
use registrar_core::ApplicationError;
use serde_json::json;

use crate::commands::form::{load_documents, load_form, registration_data, review_summary};
use crate::commands::CommandResult;

/// Offline check of a form file; nothing is sent.
pub fn run(form_path: &Path, document_paths: &[PathBuf]) -> CommandResult {
    let loaded = load_form(form_path).and_then(|form| {
        let documents = load_documents(document_paths)?;
        Ok(registration_data(form, documents))
    });
    let data = match loaded {
        Ok(data) => data,
        Err(error) => return CommandResult::from_error("validate", &error),
    };

    let errors = validate_registration(&data);
    if errors.is_empty() {
        return CommandResult::success_with_details(
            "validate",
            "registration form is valid",
            Some(review_summary(&data)),
        );
    }

    let first_invalid_step =
        errors.keys().filter_map(FieldKey::step).min().map(|step| step.number());
    let details = json!({ "errors": &errors, "first_invalid_step": first_invalid_step });
    let error = ApplicationError::Submit(SubmitError::Validation(errors));
    CommandResult::failure_with_details(
        "validate",
        error.error_class(),
        error.to_string(),
        error.exit_code(),
        Some(details),
    )
}
