pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod form;
pub mod gateway;
pub mod session;
pub mod submission;
pub mod validation;
pub mod wizard;

pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat};
pub use domain::company::{Address, CompanyInfo};
pub use domain::document::{format_file_size, Document, DocumentAdvisory};
pub use domain::profile::{CompanyProfile, UserProfile};
pub use domain::registration::{RegistrationData, RegistrationForm};
pub use domain::user::{Role, UserInfo};
pub use errors::{ApplicationError, SubmitError, WizardError};
pub use form::{FieldKey, FormErrors};
pub use gateway::{RegistrationGateway, RegistrationResponse, TransportError};
pub use session::{FileSessionStore, SessionContext, SessionError, SessionStore, ShellView};
pub use submission::SubmissionPayload;
pub use validation::{validate_company_info, validate_registration, validate_user_info};
pub use wizard::{RegistrationReceipt, RegistrationWizard, Step};
