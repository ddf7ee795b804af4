pub mod machine;
pub mod step;

pub use machine::{
    PendingSubmission, Progress, RegistrationReceipt, RegistrationWizard, StepTransition,
    SubmissionOutcome,
};
pub use step::Step;
