use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::company::CompanyInfo;
use crate::domain::document::Document;
use crate::domain::profile::UserProfile;
use crate::domain::registration::RegistrationData;
use crate::domain::user::UserInfo;
use crate::errors::{SubmitError, WizardError};
use crate::form::{FieldKey, FormErrors};
use crate::gateway::{RegistrationGateway, RegistrationResponse, TransportError};
use crate::session::SessionContext;
use crate::submission::SubmissionPayload;
use crate::validation::{validate_company_info, validate_registration, validate_user_info};
use crate::wizard::step::Step;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StepTransition {
    pub from: Step,
    pub to: Step,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub step: u8,
    pub total: u8,
    pub title: &'static str,
}

/// Result of an accepted registration. The caller keeps the "complete"
/// state; the wizard itself is finished with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegistrationReceipt {
    pub correlation_id: String,
    pub session_established: bool,
    pub user: Option<UserProfile>,
    pub message: Option<String>,
}

/// The four-step registration flow: current step, accumulated data, active
/// errors and the single-flight submission guard.
#[derive(Debug)]
pub struct RegistrationWizard {
    step: Step,
    data: RegistrationData,
    errors: FormErrors,
    submitting: Arc<AtomicBool>,
}

impl Default for RegistrationWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self::with_data(RegistrationData::default())
    }

    /// Starts on step 1 with pre-filled data and no errors.
    pub fn with_data(data: RegistrationData) -> Self {
        Self {
            step: Step::Company,
            data,
            errors: FormErrors::new(),
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn current_step(&self) -> Step {
        self.step
    }

    pub fn data(&self) -> &RegistrationData {
        &self.data
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn progress(&self) -> Progress {
        Progress { step: self.step.number(), total: Step::COUNT, title: self.step.title() }
    }

    /// Whether the forward action should be enabled. On the review step it
    /// needs accepted terms and no submission in flight.
    pub fn can_proceed(&self) -> bool {
        if self.step.is_last() {
            return self.data.terms_accepted && !self.is_submitting();
        }
        true
    }

    pub fn update_company_info(&mut self, company_info: CompanyInfo) {
        self.data.company_info = company_info;
        let cleared = self.errors.clear_where(FieldKey::is_company);
        debug!(event_name = "wizard.company_updated", cleared, "company info replaced");
    }

    pub fn update_user_info(&mut self, user_info: UserInfo) {
        self.data.user_info = user_info;
        let cleared = self.errors.clear_where(FieldKey::is_user);
        debug!(event_name = "wizard.user_updated", cleared, "user info replaced");
    }

    pub fn update_documents(&mut self, documents: Vec<Document>) {
        self.data.documents = documents;
    }

    pub fn add_document(&mut self, document: Document) {
        let mut documents = self.data.documents.clone();
        documents.push(document);
        self.update_documents(documents);
    }

    /// Removes the document at `index`; out-of-range indexes are ignored.
    pub fn remove_document(&mut self, index: usize) -> Option<Document> {
        if index >= self.data.documents.len() {
            return None;
        }
        let mut documents = self.data.documents.clone();
        let removed = documents.remove(index);
        self.update_documents(documents);
        Some(removed)
    }

    /// Accepting clears the `terms` error; declining never re-adds it.
    pub fn update_terms_accepted(&mut self, accepted: bool) {
        self.data.terms_accepted = accepted;
        if accepted {
            self.errors.remove(&FieldKey::Terms);
        }
    }

    /// Validates the current step and advances when it passes.
    ///
    /// A failing step replaces the whole error map with its own errors.
    pub fn next_step(&mut self) -> Result<StepTransition, WizardError> {
        let step_errors = match self.step {
            Step::Company => validate_company_info(&self.data.company_info),
            Step::Account => validate_user_info(&self.data.user_info),
            Step::Documents | Step::Review => FormErrors::new(),
        };

        if !step_errors.is_empty() {
            info!(
                event_name = "wizard.step_rejected",
                step = self.step.number(),
                error_count = step_errors.len(),
                "step validation failed"
            );
            self.errors = step_errors.clone();
            return Err(WizardError::StepInvalid { step: self.step, errors: step_errors });
        }

        let transition = StepTransition { from: self.step, to: self.step.next() };
        self.step = transition.to;
        info!(
            event_name = "wizard.step_advanced",
            from = transition.from.number(),
            to = transition.to.number(),
            "wizard advanced"
        );
        Ok(transition)
    }

    pub fn prev_step(&mut self) -> StepTransition {
        let transition = StepTransition { from: self.step, to: self.step.previous() };
        self.step = transition.to;
        transition
    }

    /// Validates everything, sends one registration request and records the
    /// result.
    pub async fn submit_registration<G>(
        &mut self,
        gateway: &G,
        session: &SessionContext,
    ) -> Result<RegistrationReceipt, SubmitError>
    where
        G: RegistrationGateway + ?Sized,
    {
        let pending = self.begin_submission()?;
        let outcome = pending.send(gateway).await;
        self.finish_submission(outcome, session)
    }

    /// First half of a submission: validation, guard acquisition and
    /// encoding. While the returned value (or its outcome) is alive, further
    /// calls fail with [`SubmitError::AlreadySubmitting`].
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, SubmitError> {
        let validation_errors = validate_registration(&self.data);
        if !validation_errors.is_empty() {
            info!(
                event_name = "wizard.submit_invalid",
                error_count = validation_errors.len(),
                "registration failed validation; nothing sent"
            );
            self.errors = validation_errors.clone();
            return Err(SubmitError::Validation(validation_errors));
        }

        let guard = SubmitGuard::acquire(&self.submitting).ok_or_else(|| {
            warn!(
                event_name = "wizard.submit_busy",
                "registration submission already in flight"
            );
            SubmitError::AlreadySubmitting
        })?;

        let correlation_id = Uuid::new_v4().to_string();
        let payload = SubmissionPayload::encode(&self.data);
        info!(
            event_name = "wizard.submit_started",
            correlation_id = %correlation_id,
            document_count = payload.documents().len(),
            "registration submission started"
        );

        Ok(PendingSubmission { correlation_id, payload, guard })
    }

    /// Second half of a submission: turns the gateway result into wizard
    /// state and, on success, a stored session.
    ///
    /// Only the wizard that began the submission may record it. An outcome
    /// from another wizard is refused with [`SubmitError::ForeignOutcome`]
    /// and leaves this wizard untouched.
    pub fn finish_submission(
        &mut self,
        outcome: SubmissionOutcome,
        session: &SessionContext,
    ) -> Result<RegistrationReceipt, SubmitError> {
        if !outcome.guard.belongs_to(&self.submitting) {
            warn!(
                event_name = "wizard.foreign_outcome",
                correlation_id = %outcome.correlation_id,
                "submission outcome handed to a wizard that did not start it"
            );
            return Err(SubmitError::ForeignOutcome);
        }

        let SubmissionOutcome { correlation_id, result, guard } = outcome;

        let receipt = match result {
            Ok(response) => {
                self.errors.remove(&FieldKey::Submit);
                Ok(self.accept(correlation_id, response, session))
            }
            Err(error) => {
                let message = error.user_message();
                warn!(
                    event_name = "wizard.submit_rejected",
                    correlation_id = %correlation_id,
                    error = %error,
                    "registration submission failed"
                );
                self.errors.insert(FieldKey::Submit, message.clone());
                Err(SubmitError::Rejected { message })
            }
        };

        drop(guard);
        receipt
    }

    fn accept(
        &self,
        correlation_id: String,
        response: RegistrationResponse,
        session: &SessionContext,
    ) -> RegistrationReceipt {
        let RegistrationResponse { token, user, message, .. } = response;

        let session_established = match token {
            Some(token) => match session.establish(token, user.clone()) {
                Ok(()) => true,
                Err(error) => {
                    warn!(
                        event_name = "wizard.session_persist_failed",
                        correlation_id = %correlation_id,
                        error = %error,
                        "registration accepted but session could not be stored"
                    );
                    false
                }
            },
            None => false,
        };

        info!(
            event_name = "wizard.submit_accepted",
            correlation_id = %correlation_id,
            session_established,
            "registration accepted"
        );

        RegistrationReceipt { correlation_id, session_established, user, message }
    }
}

/// Encoded registration waiting to be sent. Holds the submission guard.
#[derive(Debug)]
pub struct PendingSubmission {
    correlation_id: String,
    payload: SubmissionPayload,
    guard: SubmitGuard,
}

impl PendingSubmission {
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn payload(&self) -> &SubmissionPayload {
        &self.payload
    }

    /// Issues exactly one gateway call.
    pub async fn send<G>(self, gateway: &G) -> SubmissionOutcome
    where
        G: RegistrationGateway + ?Sized,
    {
        let Self { correlation_id, payload, guard } = self;
        let result = gateway.register(payload).await;
        SubmissionOutcome { correlation_id, result, guard }
    }
}

/// Gateway result still holding the submission guard until the wizard has
/// recorded it.
#[derive(Debug)]
pub struct SubmissionOutcome {
    correlation_id: String,
    result: Result<RegistrationResponse, TransportError>,
    guard: SubmitGuard,
}

#[derive(Debug)]
struct SubmitGuard {
    flag: Arc<AtomicBool>,
}

impl SubmitGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: Arc::clone(flag) })
    }

    fn belongs_to(&self, flag: &Arc<AtomicBool>) -> bool {
        Arc::ptr_eq(&self.flag, flag)
    }
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::RegistrationWizard;
    use crate::domain::company::{Address, CompanyInfo};
    use crate::domain::document::Document;
    use crate::domain::profile::UserProfile;
    use crate::domain::user::{Role, UserInfo};
    use crate::errors::{SubmitError, WizardError};
    use crate::form::{AddressField, CompanyField, FieldKey, FormErrors, UserField};
    use crate::gateway::{RegistrationGateway, RegistrationResponse, TransportError};
    use crate::session::{InMemorySessionStore, SessionContext};
    use crate::submission::SubmissionPayload;
    use crate::validation::validate_company_info;
    use crate::wizard::Step;

    struct StubGateway {
        calls: AtomicUsize,
        response: Result<RegistrationResponse, TransportError>,
    }

    impl StubGateway {
        fn accepting(token: Option<&str>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: Ok(RegistrationResponse {
                    token: token.map(str::to_string),
                    user: Some(UserProfile {
                        id: 42,
                        email: "ada@acme.example".to_string(),
                        ..UserProfile::default()
                    }),
                    ..RegistrationResponse::default()
                }),
            }
        }

        fn failing(error: TransportError) -> Self {
            Self { calls: AtomicUsize::new(0), response: Err(error) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RegistrationGateway for StubGateway {
        async fn register(
            &self,
            _payload: SubmissionPayload,
        ) -> Result<RegistrationResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    struct BlockingGateway {
        release: Notify,
    }

    #[async_trait]
    impl RegistrationGateway for BlockingGateway {
        async fn register(
            &self,
            _payload: SubmissionPayload,
        ) -> Result<RegistrationResponse, TransportError> {
            self.release.notified().await;
            Ok(RegistrationResponse::default())
        }
    }

    fn complete_company() -> CompanyInfo {
        CompanyInfo {
            company_name: "Acme Corp".to_string(),
            industry: "technology".to_string(),
            company_size: "11-50".to_string(),
            website: Some("https://acme.example".to_string()),
            tax_id: "12-3456789".to_string(),
            phone: "+1 555 0100".to_string(),
            address: Address {
                street: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                zip_code: "62701".to_string(),
                country: "US".to_string(),
            },
        }
    }

    fn complete_user() -> UserInfo {
        UserInfo {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@acme.example".to_string(),
            role: Some(Role::Admin),
            department: "it".to_string(),
            job_title: "CTO".to_string(),
            phone: "+1 555 0101".to_string(),
            ..UserInfo::default()
        }
        .with_password("Abcdef1$")
        .with_confirm_password("Abcdef1$")
    }

    fn ready_wizard() -> RegistrationWizard {
        let mut wizard = RegistrationWizard::new();
        wizard.update_company_info(complete_company());
        wizard.update_user_info(complete_user());
        wizard.update_terms_accepted(true);
        wizard
    }

    #[test]
    fn incomplete_company_blocks_step_one_with_validator_output() {
        let mut wizard = RegistrationWizard::new();
        let partial = CompanyInfo { company_name: "Acme".to_string(), ..CompanyInfo::default() };
        wizard.update_company_info(partial.clone());

        let error = wizard.next_step().expect_err("incomplete company must not advance");

        assert_eq!(wizard.current_step(), Step::Company);
        assert_eq!(wizard.errors(), &validate_company_info(&partial));
        assert!(matches!(error, WizardError::StepInvalid { step: Step::Company, .. }));
    }

    #[test]
    fn completing_company_advances_with_clean_errors() {
        let mut wizard = RegistrationWizard::new();
        assert!(wizard.next_step().is_err());

        wizard.update_company_info(complete_company());
        let transition = wizard.next_step().expect("complete company should advance");

        assert_eq!((transition.from, transition.to), (Step::Company, Step::Account));
        assert_eq!(wizard.current_step(), Step::Account);
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn failing_step_replaces_unrelated_errors() {
        let mut wizard = ready_wizard();
        wizard.update_terms_accepted(false);
        let _ = wizard.begin_submission();
        assert!(wizard.errors().contains(&FieldKey::Terms));

        wizard.update_company_info(CompanyInfo::default());
        let _ = wizard.next_step();

        assert!(!wizard.errors().contains(&FieldKey::Terms));
        assert_eq!(wizard.errors().len(), 10);
    }

    #[test]
    fn prev_step_is_floored_and_leaves_errors_alone() {
        let mut wizard = RegistrationWizard::new();
        let _ = wizard.next_step();
        let before = wizard.errors().clone();

        wizard.prev_step();
        assert_eq!(wizard.current_step(), Step::Company);
        assert_eq!(wizard.errors(), &before);

        let mut wizard = ready_wizard();
        wizard.next_step().expect("1 -> 2");
        wizard.next_step().expect("2 -> 3");
        assert_eq!(wizard.current_step(), Step::Documents);
        wizard.prev_step();
        assert_eq!(wizard.current_step(), Step::Account);
    }

    #[test]
    fn documents_and_review_steps_never_validate() {
        let mut wizard = ready_wizard();
        wizard.next_step().expect("1 -> 2");
        wizard.next_step().expect("2 -> 3");

        wizard.update_company_info(CompanyInfo::default());
        wizard.update_terms_accepted(false);
        wizard.next_step().expect("documents step is always passable");
        assert_eq!(wizard.current_step(), Step::Review);

        let transition = wizard.next_step().expect("review step does not validate here");
        assert_eq!(transition.to, Step::Review);
    }

    #[test]
    fn company_edits_keep_user_phone_error_and_vice_versa() {
        let mut wizard = RegistrationWizard::new();
        wizard.update_user_info(UserInfo { phone: String::new(), ..complete_user() });
        let _ = wizard.begin_submission();
        let user_phone = FieldKey::User(UserField::Phone);
        let company_phone = FieldKey::Company(CompanyField::Phone);
        assert!(wizard.errors().contains(&user_phone));
        assert!(wizard.errors().contains(&company_phone));

        wizard.update_company_info(complete_company());
        assert!(wizard.errors().contains(&user_phone));
        assert!(!wizard.errors().contains(&company_phone));
        assert!(!wizard.errors().contains(&FieldKey::address(AddressField::City)));

        let _ = wizard.begin_submission();
        wizard.update_company_info(CompanyInfo::default());
        let _ = wizard.begin_submission();
        wizard.update_user_info(complete_user());
        assert!(!wizard.errors().contains(&user_phone));
        assert!(wizard.errors().contains(&company_phone));
    }

    #[test]
    fn user_edits_clear_every_user_key_unconditionally() {
        let mut wizard = RegistrationWizard::new();
        wizard.update_company_info(complete_company());
        wizard.next_step().expect("1 -> 2");
        assert!(wizard.next_step().is_err());
        assert!(wizard.errors().len() > 1);

        wizard.update_user_info(UserInfo { first_name: "Ada".to_string(), ..UserInfo::default() });
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn declining_terms_does_not_add_an_error() {
        let mut wizard = ready_wizard();
        wizard.update_terms_accepted(false);
        assert!(wizard.errors().is_empty());
        assert!(!wizard.data().terms_accepted);
    }

    #[test]
    fn accepting_terms_clears_only_the_terms_error() {
        let mut wizard = ready_wizard();
        wizard.update_terms_accepted(false);
        let mut company = complete_company();
        company.company_name.clear();
        wizard.update_company_info(company);

        let error = wizard.begin_submission().expect_err("terms and name are missing");
        assert!(matches!(error, SubmitError::Validation(_)));
        assert!(wizard.errors().contains(&FieldKey::Terms));
        assert!(wizard.errors().contains(&FieldKey::Company(CompanyField::CompanyName)));
        let step = wizard.current_step();

        wizard.update_terms_accepted(true);

        assert!(!wizard.errors().contains(&FieldKey::Terms));
        let name_only = FormErrors::single(
            FieldKey::Company(CompanyField::CompanyName),
            "Company name is required",
        );
        assert_eq!(wizard.errors(), &name_only);
        assert!(wizard.data().terms_accepted);
        assert_eq!(wizard.current_step(), step);
        assert!(!wizard.is_submitting());
    }

    #[test]
    fn document_list_edits_are_positional() {
        let mut wizard = RegistrationWizard::new();
        wizard.add_document(Document::new("a.pdf", vec![1]));
        wizard.add_document(Document::new("b.pdf", vec![2]));
        wizard.add_document(Document::new("c.pdf", vec![3]));

        let removed = wizard.remove_document(1).expect("index 1 exists");
        assert_eq!(removed.file_name, "b.pdf");
        assert!(wizard.remove_document(9).is_none());

        let names: Vec<&str> =
            wizard.data().documents.iter().map(|doc| doc.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "c.pdf"]);
    }

    #[test]
    fn review_step_can_proceed_only_with_terms() {
        let mut wizard = ready_wizard();
        assert!(wizard.can_proceed());
        for _ in 0..3 {
            wizard.next_step().expect("advance");
        }
        assert_eq!(wizard.progress().step, 4);
        assert_eq!(wizard.progress().title, "Review & Submit");

        wizard.update_terms_accepted(false);
        assert!(!wizard.can_proceed());
        wizard.update_terms_accepted(true);
        assert!(wizard.can_proceed());
    }

    #[tokio::test]
    async fn unaccepted_terms_fail_locally_without_network() {
        let mut wizard = ready_wizard();
        wizard.update_terms_accepted(false);
        let gateway = StubGateway::accepting(Some("t"));
        let session = SessionContext::in_memory();

        let error = wizard
            .submit_registration(&gateway, &session)
            .await
            .expect_err("terms are required");

        let expected =
            FormErrors::single(FieldKey::Terms, "You must accept the terms and conditions");
        assert_eq!(error, SubmitError::Validation(expected.clone()));
        assert_eq!(wizard.errors(), &expected);
        assert_eq!(gateway.calls(), 0);
        assert!(!wizard.is_submitting());
    }

    #[tokio::test]
    async fn accepted_registration_stores_session_token() {
        let mut wizard = ready_wizard();
        let gateway = StubGateway::accepting(Some("t"));
        let store = Arc::new(InMemorySessionStore::default());
        let session = SessionContext::init(store.clone()).expect("session init");

        let receipt =
            wizard.submit_registration(&gateway, &session).await.expect("registration succeeds");

        assert!(receipt.session_established);
        assert_eq!(gateway.calls(), 1);
        assert_eq!(store.token().as_deref(), Some("t"));
        assert_eq!(session.user().map(|user| user.id), Some(42));
        assert!(!wizard.is_submitting());
    }

    #[tokio::test]
    async fn accepted_registration_without_token_leaves_session_alone() {
        let mut wizard = ready_wizard();
        let gateway = StubGateway::accepting(None);
        let session = SessionContext::in_memory();

        let receipt =
            wizard.submit_registration(&gateway, &session).await.expect("registration succeeds");

        assert!(!receipt.session_established);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn rejected_registration_sets_submit_error_and_keeps_data() {
        let mut wizard = ready_wizard();
        let gateway = StubGateway::failing(TransportError::from_status(
            400,
            Some("Bad Request"),
            Some("email taken".to_string()),
        ));
        let session = SessionContext::in_memory();

        let error =
            wizard.submit_registration(&gateway, &session).await.expect_err("server rejects");

        assert_eq!(error, SubmitError::Rejected { message: "email taken".to_string() });
        assert_eq!(wizard.errors(), &FormErrors::single(FieldKey::Submit, "email taken"));
        assert_eq!(wizard.data().company_info, complete_company());
        assert!(!session.is_authenticated());
        assert!(!wizard.is_submitting());

        let retry = StubGateway::accepting(Some("t"));
        wizard.submit_registration(&retry, &session).await.expect("retry succeeds");
        assert!(!wizard.errors().contains(&FieldKey::Submit));
    }

    #[tokio::test]
    async fn empty_transport_message_uses_generic_fallback() {
        let mut wizard = ready_wizard();
        let gateway = StubGateway::failing(TransportError::Network(String::new()));
        let session = SessionContext::in_memory();

        let _ = wizard.submit_registration(&gateway, &session).await;
        assert_eq!(wizard.errors().get(&FieldKey::Submit), Some("Registration failed"));
    }

    #[test]
    fn second_submission_is_rejected_while_one_is_pending() {
        let mut wizard = ready_wizard();
        let pending = wizard.begin_submission().expect("first submission starts");
        assert!(wizard.is_submitting());

        let error = wizard.begin_submission().expect_err("second submission must be rejected");
        assert_eq!(error, SubmitError::AlreadySubmitting);

        drop(pending);
        assert!(!wizard.is_submitting());
        assert!(wizard.begin_submission().is_ok());
    }

    #[tokio::test]
    async fn outcome_is_only_recorded_by_the_wizard_that_started_it() {
        let mut first = ready_wizard();
        let mut second = ready_wizard();
        let gateway = StubGateway::failing(TransportError::from_status(
            400,
            Some("Bad Request"),
            Some("email taken".to_string()),
        ));
        let session = SessionContext::in_memory();

        let outcome = first.begin_submission().expect("submission starts").send(&gateway).await;

        let error = second
            .finish_submission(outcome, &session)
            .expect_err("outcome belongs to the first wizard");
        assert_eq!(error, SubmitError::ForeignOutcome);
        assert!(second.errors().is_empty());
        assert!(!second.is_submitting());
        assert!(first.errors().is_empty());
        assert!(!first.is_submitting());

        let outcome =
            first.begin_submission().expect("first wizard can retry").send(&gateway).await;
        let error = first.finish_submission(outcome, &session).expect_err("server rejects");
        assert_eq!(error, SubmitError::Rejected { message: "email taken".to_string() });
        assert_eq!(first.errors(), &FormErrors::single(FieldKey::Submit, "email taken"));
        assert!(second.errors().is_empty());
    }

    #[tokio::test]
    async fn dropped_submission_future_releases_the_guard() {
        let mut wizard = ready_wizard();
        let gateway = BlockingGateway { release: Notify::new() };
        let session = SessionContext::in_memory();

        {
            let submit = wizard.submit_registration(&gateway, &session);
            tokio::pin!(submit);
            let polled = tokio::time::timeout(std::time::Duration::from_millis(20), &mut submit)
                .await;
            assert!(polled.is_err(), "gateway never answers, so the submission is still pending");
        }

        assert!(!wizard.is_submitting());
    }
}
