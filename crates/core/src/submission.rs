//! Wire encoding for `POST /api/register`.
//!
//! The endpoint takes a flat multipart body, so company and user fields
//! share one namespace; the user's phone goes out as `userPhone`.

use std::fmt;

use secrecy::ExposeSecret;

use crate::domain::document::Document;
use crate::domain::registration::RegistrationData;

pub const DOCUMENT_PART_PREFIX: &str = "document_";

/// One binary part of the registration body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentPart {
    pub name: String,
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// Encoded registration body, transport-agnostic.
#[derive(Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    fields: Vec<(&'static str, String)>,
    documents: Vec<DocumentPart>,
}

impl SubmissionPayload {
    pub fn encode(data: &RegistrationData) -> Self {
        let company = &data.company_info;
        let user = &data.user_info;

        let fields = vec![
            ("companyName", company.company_name.clone()),
            ("industry", company.industry.clone()),
            ("companySize", company.company_size.clone()),
            ("website", company.website_or_empty().to_string()),
            ("taxId", company.tax_id.clone()),
            ("phone", company.phone.clone()),
            ("street", company.address.street.clone()),
            ("city", company.address.city.clone()),
            ("state", company.address.state.clone()),
            ("zipCode", company.address.zip_code.clone()),
            ("country", company.address.country.clone()),
            ("firstName", user.first_name.clone()),
            ("lastName", user.last_name.clone()),
            ("email", user.email.clone()),
            ("password", user.password.expose_secret().to_string()),
            ("role", user.role.map(|role| role.as_str().to_string()).unwrap_or_default()),
            ("department", user.department.clone()),
            ("jobTitle", user.job_title.clone()),
            ("userPhone", user.phone.clone()),
            ("termsAccepted", data.terms_accepted.to_string()),
        ];

        let documents = data.documents.iter().enumerate().map(document_part).collect();

        Self { fields, documents }
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(key, _)| *key == name).map(|(_, value)| value.as_str())
    }

    pub fn documents(&self) -> &[DocumentPart] {
        &self.documents
    }

    pub fn into_parts(self) -> (Vec<(&'static str, String)>, Vec<DocumentPart>) {
        (self.fields, self.documents)
    }
}

impl fmt::Debug for SubmissionPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(key, value)| {
                if *key == "password" {
                    (*key, "[REDACTED]")
                } else {
                    (*key, value.as_str())
                }
            })
            .collect();
        let documents: Vec<&str> = self.documents.iter().map(|part| part.name.as_str()).collect();

        f.debug_struct("SubmissionPayload")
            .field("fields", &fields)
            .field("documents", &documents)
            .finish()
    }
}

fn document_part((index, document): (usize, &Document)) -> DocumentPart {
    DocumentPart {
        name: format!("{DOCUMENT_PART_PREFIX}{index}"),
        file_name: document.file_name.clone(),
        content_type: document.resolved_content_type().to_string(),
        content: document.content.clone(),
    }
}
