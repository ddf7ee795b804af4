use serde::Deserialize;

use crate::domain::company::CompanyInfo;
use crate::domain::document::Document;
use crate::domain::user::UserInfo;

/// Everything the wizard accumulates before submission.
#[derive(Clone, Debug, Default)]
pub struct RegistrationData {
    pub company_info: CompanyInfo,
    pub user_info: UserInfo,
    pub documents: Vec<Document>,
    pub terms_accepted: bool,
}

/// On-disk form layout used to pre-fill a wizard (`[company]`, `[user]`).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub company: CompanyInfo,
    pub user: UserInfo,
    pub terms_accepted: bool,
}

impl RegistrationForm {
    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
