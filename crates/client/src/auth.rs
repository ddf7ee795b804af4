use std::sync::Arc;

use registrar_core::domain::profile::UserProfile;
use registrar_core::session::SessionContext;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::companies::{CompaniesPage, CompaniesQuery};
use crate::error::ClientError;
use crate::http::{RegistrarClient, COMPANIES_PATH, HEALTH_PATH, LOGIN_PATH, PROFILE_PATH};

#[derive(Clone, Debug)]
pub struct LoginCredentials {
    pub email: String,
    pub password: SecretString,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: SecretString::from(password.into()) }
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Partial profile for `PUT /api/profile`. Unset fields are left out of the
/// request body.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.department.is_none()
            && self.job_title.is_none()
            && self.phone.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Authenticated API access bound to one session context.
///
/// Login and profile reads refresh the cached user; logout clears both the
/// in-memory and the persisted session.
#[derive(Clone, Debug)]
pub struct AuthService {
    client: RegistrarClient,
    session: Arc<SessionContext>,
}

impl AuthService {
    pub fn new(client: RegistrarClient, session: Arc<SessionContext>) -> Self {
        Self { client, session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.session.user()
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ClientError> {
        let body =
            LoginBody { email: &credentials.email, password: credentials.password.expose_secret() };
        let request = self.client.post(LOGIN_PATH)?.json(&body);
        let response: LoginResponse = self.client.send_json("POST /api/login", request).await?;

        self.session.establish(response.token.clone(), response.user.clone())?;
        info!(
            event_name = "auth.login_succeeded",
            user_id = response.user.as_ref().map(|user| user.id),
            "logged in"
        );
        Ok(response)
    }

    pub async fn get_profile(&self) -> Result<UserProfile, ClientError> {
        let token = self.require_token()?;
        let request = self.client.get(PROFILE_PATH)?.bearer_auth(token.expose_secret());
        let user: UserProfile = self.client.send_json("GET /api/profile", request).await?;
        self.session.update_user(user.clone())?;
        Ok(user)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ClientError> {
        let token = self.require_token()?;
        let request = self.client.put(PROFILE_PATH)?.bearer_auth(token.expose_secret()).json(update);
        let user: UserProfile = self.client.send_json("PUT /api/profile", request).await?;
        self.session.update_user(user.clone())?;
        info!(event_name = "auth.profile_updated", user_id = user.id, "profile updated");
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.session.teardown()?;
        info!(event_name = "auth.logged_out", "session cleared");
        Ok(())
    }

    /// `GET /health`; needs no token.
    pub async fn check_health(&self) -> Result<HealthStatus, ClientError> {
        let request = self.client.get(HEALTH_PATH)?;
        self.client.send_json("GET /health", request).await
    }

    pub async fn list_companies(&self, query: &CompaniesQuery) -> Result<CompaniesPage, ClientError> {
        let token = self.require_token()?;
        let request = self
            .client
            .get(COMPANIES_PATH)?
            .bearer_auth(token.expose_secret())
            .query(&query.to_pairs());
        self.client.send_json("GET /api/companies", request).await
    }

    fn require_token(&self) -> Result<SecretString, ClientError> {
        self.session.token().ok_or(ClientError::NotAuthenticated)
    }
}
