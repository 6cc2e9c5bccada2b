//! Headless client engine for the MeYouSafe incident reporting flow.
//!
//! This crate implements the core of the reporting experience without any
//! rendering: the question model and wizard session store, client-side
//! validation, autosaving progress persistence, and the submission client
//! for the reports API. Presentation layers (web, terminal, or tests)
//! drive a [`flow::ReportFlow`] and observe the session through
//! [`form::SessionEvent`]s.
//!
//! The flow is the fixed 3-step wizard: provide information, review
//! details, submit. Progress autosaves to a single storage slot and is
//! restored on the next session; submission applies a request timeout and
//! retries transient failures with a client-generated idempotency key.

pub mod api;
pub mod config;
pub mod error;
pub mod flow;
pub mod form;
pub mod progress;
pub mod validate;

pub use api::{ApiError, ReportApi, Submission};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use flow::{ReportFlow, ReportStep};
pub use form::{AnswerMap, AnswerValue, FormSession, QuestionDefinition, QuestionType, SessionEvent};
pub use progress::{Autosaver, PersistedProgress, ProgressStore};
pub use validate::{validate_field, validate_form, Rule, ValidationErrors};
