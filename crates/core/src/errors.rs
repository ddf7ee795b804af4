use thiserror::Error;

use crate::config::ConfigError;
use crate::form::FormErrors;
use crate::gateway::TransportError;
use crate::session::SessionError;
use crate::wizard::Step;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("{step} has invalid fields: {errors}")]
    StepInvalid { step: Step, errors: FormErrors },
}

impl WizardError {
    pub fn step(&self) -> Step {
        match self {
            Self::StepInvalid { step, .. } => *step,
        }
    }

    pub fn errors(&self) -> &FormErrors {
        match self {
            Self::StepInvalid { errors, .. } => errors,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("registration has invalid fields: {0}")]
    Validation(FormErrors),
    #[error("a registration submission is already in flight")]
    AlreadySubmitting,
    #[error("submission outcome belongs to another registration wizard")]
    ForeignOutcome,
    #[error("registration rejected: {message}")]
    Rejected { message: String },
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("could not load registration form: {0}")]
    Form(String),
}

impl ApplicationError {
    /// Stable machine-readable class for structured output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config_validation",
            Self::Session(_) => "session",
            Self::Wizard(_) | Self::Submit(SubmitError::Validation(_)) => "validation",
            Self::Submit(SubmitError::AlreadySubmitting | SubmitError::ForeignOutcome) => "busy",
            Self::Submit(SubmitError::Rejected { .. }) | Self::Transport(_) => "remote",
            Self::Form(_) => "form_input",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Form(_) => 3,
            Self::Wizard(_) | Self::Submit(SubmitError::Validation(_)) => 4,
            Self::Submit(SubmitError::Rejected { .. }) | Self::Transport(_) => 5,
            Self::Session(_)
            | Self::Submit(SubmitError::AlreadySubmitting | SubmitError::ForeignOutcome) => 6,
        }
    }

    /// Field errors carried by the failure, if any.
    pub fn form_errors(&self) -> Option<&FormErrors> {
        match self {
            Self::Wizard(error) => Some(error.errors()),
            Self::Submit(SubmitError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }
}
