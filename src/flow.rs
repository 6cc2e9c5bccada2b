//! Report wizard orchestration.
//!
//! `ReportFlow` ties the session store, validator, progress persistence,
//! and submission client into the 3-step flow: provide information, review,
//! submit. It owns touched-field tracking (errors surface only for fields
//! the reporter interacted with, or once advancement was attempted), the
//! autosave timer lifecycle, and the idempotency key for the submission in
//! flight.

use crate::api::{generate_idempotency_key, ApiError, ReportApi, Submission};
use crate::config::Config;
use crate::error::AppError;
use crate::form::{report_questions, AnswerValue, FormSession, QuestionDefinition};
use crate::progress::{Autosaver, FileBackend, ProgressStore};
use crate::validate::{validate_field, validate_form, RuleTable, ValidationErrors};
use log::*;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Form id used when no active form definition has been fetched.
///
pub const DEFAULT_FORM_ID: &str = "default";

/// One stage of the fixed 3-stage wizard.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ReportStep {
    Form,
    Confirm,
    Submit,
}

impl ReportStep {
    /// Map a session step number onto a wizard stage.
    ///
    pub fn from_step(step: usize) -> Option<ReportStep> {
        match step {
            1 => Some(ReportStep::Form),
            2 => Some(ReportStep::Confirm),
            3 => Some(ReportStep::Submit),
            _ => None,
        }
    }

    pub fn as_step(&self) -> usize {
        match self {
            ReportStep::Form => 1,
            ReportStep::Confirm => 2,
            ReportStep::Submit => 3,
        }
    }

    /// Progress label shown for this stage.
    ///
    pub fn label(&self) -> &'static str {
        match self {
            ReportStep::Form => "Provide Information",
            ReportStep::Confirm => "Review Details",
            ReportStep::Submit => "Submit Report",
        }
    }
}

/// Drives one reporting session through the wizard.
///
pub struct ReportFlow {
    session: Arc<Mutex<FormSession>>,
    questions: Vec<QuestionDefinition>,
    rules: RuleTable,
    form_id: String,
    touched: HashSet<String>,
    errors: ValidationErrors,
    progress: ProgressStore,
    api: ReportApi,
    autosave_interval: Duration,
    autosaver: Option<Autosaver>,
    pending_submission_key: Option<String>,
}

impl ReportFlow {
    /// Return a new flow over the built-in questionnaire.
    ///
    pub fn new(api: ReportApi, progress: ProgressStore) -> ReportFlow {
        ReportFlow::with_questions(api, progress, report_questions())
    }

    /// Return a new flow over an explicit question list.
    ///
    pub fn with_questions(
        api: ReportApi,
        progress: ProgressStore,
        questions: Vec<QuestionDefinition>,
    ) -> ReportFlow {
        ReportFlow {
            session: Arc::new(Mutex::new(FormSession::new())),
            questions,
            rules: RuleTable::new(),
            form_id: DEFAULT_FORM_ID.to_owned(),
            touched: HashSet::new(),
            errors: ValidationErrors::new(),
            progress,
            api,
            autosave_interval: crate::progress::DEFAULT_AUTOSAVE_INTERVAL,
            autosaver: None,
            pending_submission_key: None,
        }
    }

    /// Build a flow from engine configuration: file-backed progress storage
    /// and an API client with the configured timeout and retry policy.
    ///
    pub fn from_config(config: &Config) -> Result<ReportFlow, AppError> {
        let api = ReportApi::with_policy(
            &config.api_base_url,
            config.request_timeout(),
            config.max_retries,
            config.retry_delay(),
        );
        let backend = match &config.storage_dir {
            Some(directory) => FileBackend::new(directory),
            None => FileBackend::default_location()?,
        };
        let progress = ProgressStore::new(Arc::new(backend));
        Ok(ReportFlow::new(api, progress).with_autosave_interval(config.autosave_interval()))
    }

    /// Attach custom validation rules, keyed by question id.
    ///
    pub fn with_rules(mut self, rules: RuleTable) -> ReportFlow {
        self.rules = rules;
        self
    }

    /// Override the autosave interval.
    ///
    pub fn with_autosave_interval(mut self, interval: Duration) -> ReportFlow {
        self.autosave_interval = interval;
        self
    }

    /// Shared handle to the underlying session, for observers and the
    /// autosave task.
    ///
    pub fn session_handle(&self) -> Arc<Mutex<FormSession>> {
        Arc::clone(&self.session)
    }

    pub fn questions(&self) -> &[QuestionDefinition] {
        &self.questions
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    /// Current wizard stage.
    ///
    pub fn step(&self) -> ReportStep {
        ReportStep::from_step(self.session().current_step()).unwrap_or(ReportStep::Form)
    }

    /// Validation errors for touched fields, in question-id order.
    ///
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Replace the questionnaire with the active form definition from the
    /// API. On failure the current (built-in) questions are kept.
    ///
    pub async fn load_questions(&mut self) {
        match self.api.active_form().await {
            Ok(form) => {
                info!("Loaded active form {} ({} questions)", form.id, form.questions.len());
                self.form_id = form.id;
                self.questions = form.questions;
            }
            Err(e) => {
                warn!("Could not fetch active form, keeping built-in questions: {}", e);
            }
        }
    }

    /// Apply stored progress, if any. Returns whether a snapshot was
    /// applied.
    ///
    pub fn restore(&mut self) -> bool {
        let mut session = self.session();
        self.progress.restore_into(&mut session)
    }

    /// Record an answer; revalidates the field if it was already touched.
    ///
    pub fn set_answer(&mut self, question_id: &str, value: AnswerValue) {
        self.session().set_answer(question_id, value);
        if self.touched.contains(question_id) {
            self.revalidate(question_id);
        }
    }

    /// Toggle a checkbox option; revalidates the field if it was already
    /// touched.
    ///
    pub fn toggle_option(&mut self, question_id: &str, option: &str) {
        self.session().toggle_option(question_id, option);
        if self.touched.contains(question_id) {
            self.revalidate(question_id);
        }
    }

    /// Mark a field as interacted with and validate it.
    ///
    pub fn blur(&mut self, question_id: &str) {
        self.touched.insert(question_id.to_owned());
        self.revalidate(question_id);
    }

    /// Save a snapshot of the current session on demand.
    ///
    pub fn save_progress(&self) -> bool {
        let session = self.session();
        self.progress.save(&session)
    }

    /// Validate everything and advance to review when the form is clean.
    /// On failure every field is marked touched, the error map is retained
    /// for display, and the step does not change.
    ///
    pub fn continue_to_review(&mut self) -> Result<(), ValidationErrors> {
        for question in &self.questions {
            self.touched.insert(question.id.clone());
        }

        let errors = {
            let session = self.session();
            validate_form(&self.questions, session.answers(), &self.rules)
        };
        self.errors = errors;
        if !self.errors.is_empty() {
            debug!("{} field(s) failed validation", self.errors.len());
            return Err(self.errors.clone());
        }

        let mut session = self.session();
        self.progress.save(&session);
        session.advance_step();
        Ok(())
    }

    /// Return from review to the entry step.
    ///
    pub fn back_to_form(&mut self) {
        self.session().retreat_step();
    }

    /// Advance from review to the submit step.
    ///
    pub fn proceed_to_submit(&mut self) {
        self.session().advance_step();
    }

    /// Submit the completed answer set.
    ///
    /// Returns `Ok(None)` when nothing was applied: a submission is already
    /// in flight, or the session was reset while the request was running
    /// (the late result is discarded rather than applied to stale state).
    /// The idempotency key is created once per logical submission and
    /// reused across automatic retries and manual "try again".
    ///
    pub async fn submit(&mut self) -> Result<Option<Submission>, ApiError> {
        let (epoch, answers) = {
            let mut session = self.session();
            if session.is_submitting() {
                debug!("Ignoring submit while a submission is in flight");
                return Ok(None);
            }
            session.set_submitting(true);
            (session.epoch(), session.answers().clone())
        };

        let key = self
            .pending_submission_key
            .get_or_insert_with(generate_idempotency_key)
            .clone();

        let result = self.api.submit(&self.form_id, &answers, &key).await;

        let mut session = self.session();
        if session.epoch() != epoch {
            debug!("Discarding submission result for a stale session");
            return Ok(None);
        }

        match result {
            Ok(submission) => {
                session.record_submission(&submission.reference_code);
                session.set_submitting(false);
                drop(session);
                self.pending_submission_key = None;
                self.progress.clear();
                info!("Report submitted with reference {}", submission.reference_code);
                Ok(Some(submission))
            }
            Err(e) => {
                session.set_submitting(false);
                // Keep the pending key so a manual retry reuses it.
                Err(e)
            }
        }
    }

    /// Reset the session and clear stored progress.
    ///
    pub fn reset(&mut self) {
        self.session().reset();
        self.touched.clear();
        self.errors.clear();
        self.pending_submission_key = None;
        self.progress.clear();
    }

    /// Start the periodic autosave timer. Restarting replaces the previous
    /// timer.
    ///
    pub fn start_autosave(&mut self) {
        self.autosaver = Some(Autosaver::start(
            Arc::clone(&self.session),
            self.progress.clone(),
            self.autosave_interval,
        ));
    }

    /// Stop the periodic autosave timer. Must be called when the form step
    /// is torn down; dropping the flow also stops it.
    ///
    pub fn stop_autosave(&mut self) {
        self.autosaver = None;
    }

    fn session(&self) -> MutexGuard<'_, FormSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn revalidate(&mut self, question_id: &str) {
        let message = {
            let question = match self.questions.iter().find(|q| q.id == question_id) {
                Some(question) => question,
                None => return,
            };
            let custom = self.rules.get(question_id).map_or(&[][..], Vec::as_slice);
            let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            validate_field(question, session.answer(question_id), custom)
        };
        match message {
            Some(message) => {
                self.errors.insert(question_id.to_owned(), message);
            }
            None => {
                self.errors.remove(question_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{MemoryBackend, ProgressStore};
    use crate::validate::messages;
    use httpmock::MockServer;
    use serde_json::json;

    fn minimal_questions() -> Vec<QuestionDefinition> {
        use crate::form::QuestionType;
        vec![
            QuestionDefinition::new(
                "incidentCategory",
                "What type of harassment occurred?",
                QuestionType::Select,
                true,
            )
            .with_options(vec!["Stalking", "Other"]),
            QuestionDefinition::new(
                "locationDetails",
                "Where exactly?",
                QuestionType::Text,
                false,
            ),
        ]
    }

    fn flow_against(server: &MockServer) -> (ReportFlow, ProgressStore) {
        let api = ReportApi::with_policy(
            &server.base_url(),
            Duration::from_secs(5),
            2,
            Duration::from_millis(1),
        );
        let store = ProgressStore::new(Arc::new(MemoryBackend::new()));
        let flow = ReportFlow::with_questions(api, store.clone(), minimal_questions());
        (flow, store)
    }

    fn offline_flow() -> (ReportFlow, ProgressStore) {
        let api = ReportApi::new("http://localhost:1");
        let store = ProgressStore::new(Arc::new(MemoryBackend::new()));
        let flow = ReportFlow::with_questions(api, store.clone(), minimal_questions());
        (flow, store)
    }

    #[test]
    fn test_step_mapping() {
        assert_eq!(ReportStep::from_step(1), Some(ReportStep::Form));
        assert_eq!(ReportStep::from_step(2), Some(ReportStep::Confirm));
        assert_eq!(ReportStep::from_step(3), Some(ReportStep::Submit));
        assert_eq!(ReportStep::from_step(0), None);
        assert_eq!(ReportStep::from_step(4), None);
        assert_eq!(ReportStep::Confirm.as_step(), 2);
        assert_eq!(ReportStep::Submit.label(), "Submit Report");
    }

    #[test]
    fn test_errors_surface_only_after_touch() {
        let (mut flow, _store) = offline_flow();

        flow.set_answer("incidentCategory", AnswerValue::from(""));
        assert!(flow.errors().is_empty());

        flow.blur("incidentCategory");
        assert_eq!(
            flow.errors().get("incidentCategory").map(String::as_str),
            Some(messages::REQUIRED)
        );

        flow.set_answer("incidentCategory", AnswerValue::from("Other"));
        assert!(flow.errors().is_empty());
    }

    #[test]
    fn test_continue_to_review_blocks_on_invalid_form() {
        let (mut flow, store) = offline_flow();

        let errors = flow.continue_to_review().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("incidentCategory"));
        assert_eq!(flow.step(), ReportStep::Form);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_continue_to_review_saves_and_advances_when_valid() {
        let (mut flow, store) = offline_flow();

        flow.set_answer("incidentCategory", AnswerValue::from("Stalking"));
        assert!(flow.continue_to_review().is_ok());
        assert_eq!(flow.step(), ReportStep::Confirm);

        let progress = store.load().expect("progress saved before advancing");
        assert_eq!(progress.current_step, 1);

        flow.back_to_form();
        assert_eq!(flow.step(), ReportStep::Form);
    }

    #[tokio::test]
    async fn test_submit_records_reference_and_clears_progress() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("POST").path("/responses");
                then.status(201).json_body(json!({
                    "id": "resp-1",
                    "formId": "default",
                    "referenceCode": "AB2C-3DEF-GH4J"
                }));
            })
            .await;

        let (mut flow, store) = flow_against(&server);
        flow.set_answer("incidentCategory", AnswerValue::from("Other"));
        flow.continue_to_review().unwrap();
        flow.proceed_to_submit();
        assert_eq!(flow.step(), ReportStep::Submit);

        let submission = flow.submit().await.unwrap().expect("submission applied");
        assert_eq!(submission.reference_code, "AB2C-3DEF-GH4J");
        mock.assert_async().await;

        let session = flow.session_handle();
        let session = session.lock().unwrap();
        assert_eq!(session.submission_id(), Some("AB2C-3DEF-GH4J"));
        assert!(!session.is_submitting());
        drop(session);

        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_submit_is_ignored_while_in_flight() {
        let (flow, _store) = offline_flow();
        let session = flow.session_handle();
        session.lock().unwrap().set_submitting(true);

        let mut flow = flow;
        let result = flow.submit().await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_idempotency_key_for_retry() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("POST").path("/responses");
                then.status(503).body("Service unavailable");
            })
            .await;

        let (mut flow, _store) = flow_against(&server);
        flow.set_answer("incidentCategory", AnswerValue::from("Other"));

        let first = flow.submit().await;
        assert!(first.is_err());
        let key_after_first = flow.pending_submission_key.clone().unwrap();

        let second = flow.submit().await;
        assert!(second.is_err());
        assert_eq!(flow.pending_submission_key.as_ref(), Some(&key_after_first));

        // 2 retries per call, 2 calls, 3 requests each.
        mock.assert_hits_async(6).await;

        let session = flow.session_handle();
        assert!(!session.lock().unwrap().is_submitting());
    }

    #[tokio::test]
    async fn test_load_questions_falls_back_to_built_in_set() {
        let (mut flow, _store) = offline_flow();
        let before = flow.questions().len();
        flow.load_questions().await;
        assert_eq!(flow.questions().len(), before);
        assert_eq!(flow.form_id(), DEFAULT_FORM_ID);
    }

    #[tokio::test]
    async fn test_load_questions_adopts_active_form() {
        let server = MockServer::start_async().await;
        let _mock = server
            .mock_async(|when, then| {
                when.method("GET").path("/forms/active");
                then.status(200).json_body(json!({
                    "id": "form-7",
                    "title": "Incident Report",
                    "isActive": true,
                    "questions": [{
                        "id": "incidentCategory",
                        "question": "What type of harassment occurred?",
                        "type": "select",
                        "required": true,
                        "options": ["Other"]
                    }]
                }));
            })
            .await;

        let (mut flow, _store) = flow_against(&server);
        flow.load_questions().await;
        assert_eq!(flow.form_id(), "form-7");
        assert_eq!(flow.questions().len(), 1);
    }

    #[test]
    fn test_restore_round_trip() {
        let (mut flow, store) = offline_flow();
        flow.set_answer("incidentCategory", AnswerValue::from("Other"));
        flow.continue_to_review().unwrap();
        assert!(store.load().is_some());

        let api = ReportApi::new("http://localhost:1");
        let mut fresh = ReportFlow::with_questions(api, store.clone(), minimal_questions());
        assert!(fresh.restore());
        let session = fresh.session_handle();
        let session = session.lock().unwrap();
        assert_eq!(
            session.answer("incidentCategory"),
            Some(&AnswerValue::from("Other"))
        );
    }

    #[test]
    fn test_reset_clears_session_errors_and_progress() {
        let (mut flow, store) = offline_flow();
        flow.set_answer("incidentCategory", AnswerValue::from("Other"));
        flow.continue_to_review().unwrap();
        flow.blur("locationDetails");
        flow.reset();

        assert_eq!(flow.step(), ReportStep::Form);
        assert!(flow.errors().is_empty());
        assert!(store.load().is_none());
        assert!(flow.pending_submission_key.is_none());
    }

    #[tokio::test]
    async fn test_autosave_lifecycle() {
        let (flow, store) = offline_flow();
        let mut flow = flow.with_autosave_interval(Duration::from_millis(20));
        flow.set_answer("incidentCategory", AnswerValue::from("Other"));

        flow.start_autosave();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(store.load().is_some());

        flow.stop_autosave();
        store.clear();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(store.load().is_none());
    }
}
