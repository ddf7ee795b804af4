use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Address as the API renders it (snake_case, unlike the form).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    pub id: u64,
    pub company_name: String,
    pub industry: String,
    pub company_size: String,
    pub website: String,
    pub tax_id: String,
    pub phone: String,
    pub address: ProfileAddress,
}

/// A user record returned by the registration, login and profile endpoints.
///
/// Every field tolerates absence so that partial payloads from older API
/// builds still decode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub department: String,
    pub job_title: String,
    pub phone: String,
    pub company_id: u64,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyProfile>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}
