//! Form model and session state.
//!
//! This module contains the question model, answer value types, and the
//! wizard session store:
//! - `QuestionDefinition` and `QuestionType` describe the form
//! - `AnswerValue`/`AnswerMap` hold user input
//! - `FormSession` tracks wizard progress and publishes `SessionEvent`s

mod answer;
mod question;
mod session;

pub use answer::{toggle_selection, AnswerMap, AnswerValue};
pub use question::{
    report_questions, QuestionDefinition, QuestionType, INCIDENT_CATEGORIES, INCIDENT_LOCATIONS,
    PREFERRED_ACTIONS, RELATIONSHIPS,
};
pub use session::{FormSession, SessionEvent, DEFAULT_TOTAL_STEPS};
