use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role `{}` (expected admin|manager|employee)", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Administrator account details collected on the second wizard step.
///
/// `confirm_password` only exists to be compared against `password`; the
/// submission encoder never puts it on the wire.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct UserInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub role: Option<Role>,
    pub department: String,
    pub job_title: String,
    pub phone: String,
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new().into(),
            confirm_password: String::new().into(),
            role: Some(Role::Admin),
            department: String::new(),
            job_title: String::new(),
            phone: String::new(),
        }
    }
}

impl UserInfo {
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = password.to_string().into();
        self
    }

    pub fn with_confirm_password(mut self, confirm_password: &str) -> Self {
        self.confirm_password = confirm_password.to_string().into();
        self
    }

    pub fn passwords_match(&self) -> bool {
        self.password.expose_secret() == self.confirm_password.expose_secret()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim()).trim().to_string()
    }
}
