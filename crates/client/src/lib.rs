//! HTTP side of the registration flow.
//!
//! [`RegistrarClient`] implements the core `RegistrationGateway` over
//! `reqwest`, and [`AuthService`] covers login, profile, company listing and
//! health checks against the same API, keeping the shared
//! `SessionContext` in step.

pub mod auth;
pub mod companies;
pub mod error;
pub mod http;

pub use auth::{AuthService, HealthStatus, LoginCredentials, LoginResponse, ProfileUpdate};
pub use companies::{CompaniesPage, CompaniesQuery};
pub use error::ClientError;
pub use http::RegistrarClient;
