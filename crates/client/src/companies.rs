use registrar_core::domain::profile::CompanyProfile;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompaniesQuery {
    pub page: u32,
    pub limit: u32,
    /// Matched by the server against company name and industry.
    pub search: Option<String>,
}

impl Default for CompaniesQuery {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT, search: None }
    }
}

impl CompaniesQuery {
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompaniesPage {
    pub companies: Vec<CompanyProfile>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl CompaniesPage {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit))
    }
}
