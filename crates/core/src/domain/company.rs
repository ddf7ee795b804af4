use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// Company details collected on the first wizard step.
///
/// `industry`, `company_size` and `address.country` hold catalog values
/// (see [`crate::catalog`]); an empty string means nothing was selected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInfo {
    pub company_name: String,
    pub industry: String,
    pub company_size: String,
    pub website: Option<String>,
    pub tax_id: String,
    pub phone: String,
    pub address: Address,
}

impl CompanyInfo {
    pub fn website_or_empty(&self) -> &str {
        self.website.as_deref().unwrap_or_default()
    }
}
