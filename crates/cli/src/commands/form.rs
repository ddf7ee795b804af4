use std::fs;
use std::path::Path;

use registrar_core::catalog::{label_for, COMPANY_SIZES, COUNTRIES, DEPARTMENTS, INDUSTRIES, ROLES};
use registrar_core::domain::document::{format_file_size, Document};
use registrar_core::domain::registration::{RegistrationData, RegistrationForm};
use registrar_core::ApplicationError;
use serde_json::{json, Value};
use tracing::warn;

pub fn load_form(path: &Path) -> Result<RegistrationForm, ApplicationError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        ApplicationError::Form(format!("could not read `{}`: {error}", path.display()))
    })?;
    RegistrationForm::from_toml(&raw).map_err(|error| {
        ApplicationError::Form(format!("could not parse `{}`: {error}", path.display()))
    })
}

/// Reads documents from disk. Size and type advisories are logged, never
/// enforced.
pub fn load_documents<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Document>, ApplicationError> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|error| {
            ApplicationError::Form(format!("could not read document `{}`: {error}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let document = Document::new(file_name, content);
        for advisory in document.advisories() {
            warn!(event_name = "cli.document_advisory", advisory = %advisory, "document advisory");
        }
        documents.push(document);
    }
    Ok(documents)
}

pub fn registration_data(form: RegistrationForm, documents: Vec<Document>) -> RegistrationData {
    RegistrationData {
        company_info: form.company,
        user_info: form.user,
        documents,
        terms_accepted: form.terms_accepted,
    }
}

/// What the review step shows: display labels rather than stored values,
/// and human-readable document sizes.
pub fn review_summary(data: &RegistrationData) -> Value {
    let company = &data.company_info;
    let user = &data.user_info;
    let role = user.role.map(|role| role.as_str()).unwrap_or_default();
    let documents: Vec<Value> = data
        .documents
        .iter()
        .map(|document| {
            json!({ "file_name": document.file_name, "size": format_file_size(document.size()) })
        })
        .collect();

    json!({
        "company": {
            "name": company.company_name,
            "industry": label_for(&INDUSTRIES, &company.industry),
            "size": label_for(&COMPANY_SIZES, &company.company_size),
            "website": company.website_or_empty(),
            "country": label_for(&COUNTRIES, &company.address.country),
        },
        "administrator": {
            "name": user.full_name(),
            "email": user.email,
            "role": label_for(&ROLES, role),
            "department": label_for(&DEPARTMENTS, &user.department),
        },
        "documents": documents,
        "terms_accepted": data.terms_accepted,
    })
}
