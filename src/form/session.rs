//! Wizard session state store.
//!
//! `FormSession` is the single source of truth for wizard progress and
//! answers within one reporting session. None of its operations can fail:
//! invalid input is clamped or ignored, never raised. Mutations publish
//! typed events to an optional observer channel so presentation layers can
//! react without the store depending on any rendering mechanism.

use super::answer::{toggle_selection, AnswerMap, AnswerValue};
use log::*;
use std::sync::mpsc::Sender;

/// Number of wizard steps in the standard report flow (entry, review,
/// submit).
///
pub const DEFAULT_TOTAL_STEPS: usize = 3;

/// Events published by the session on every mutation.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    AnswerChanged { question_id: String },
    StepChanged { step: usize },
    SubmittingChanged { submitting: bool },
    SubmissionRecorded { reference: String },
    Restored,
    Reset,
}

/// Holds wizard progress and answers for one reporting session.
///
pub struct FormSession {
    current_step: usize,
    total_steps: usize,
    answers: AnswerMap,
    submission_id: Option<String>,
    is_submitting: bool,
    epoch: u64,
    events: Option<Sender<SessionEvent>>,
}

impl FormSession {
    /// Return a new session at the first step of the standard 3-step flow.
    ///
    pub fn new() -> FormSession {
        FormSession::with_total_steps(DEFAULT_TOTAL_STEPS)
    }

    /// Return a new session with a custom step count (minimum 1).
    ///
    pub fn with_total_steps(total_steps: usize) -> FormSession {
        FormSession {
            current_step: 1,
            total_steps: total_steps.max(1),
            answers: AnswerMap::new(),
            submission_id: None,
            is_submitting: false,
            epoch: 0,
            events: None,
        }
    }

    /// Attach an observer channel. Every subsequent mutation publishes a
    /// `SessionEvent`; send failures are ignored (the observer hung up).
    ///
    pub fn set_observer(&mut self, sender: Sender<SessionEvent>) {
        self.events = Some(sender);
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    /// Return the current answer for a question, if any.
    ///
    pub fn answer(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn submission_id(&self) -> Option<&str> {
        self.submission_id.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Session generation counter. Bumped on every reset; callers use it to
    /// discard async results that would land on a different generation.
    ///
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Replace the answer for a question. No validation side effect.
    ///
    pub fn set_answer(&mut self, question_id: &str, value: AnswerValue) {
        self.answers.insert(question_id.to_owned(), value);
        self.publish(SessionEvent::AnswerChanged {
            question_id: question_id.to_owned(),
        });
    }

    /// Toggle one option within a checkbox answer.
    ///
    pub fn toggle_option(&mut self, question_id: &str, option: &str) {
        toggle_selection(&mut self.answers, question_id, option);
        self.publish(SessionEvent::AnswerChanged {
            question_id: question_id.to_owned(),
        });
    }

    /// Move forward one step, clamped to the last step.
    ///
    pub fn advance_step(&mut self) {
        let next = (self.current_step + 1).min(self.total_steps);
        if next != self.current_step {
            self.current_step = next;
            self.publish(SessionEvent::StepChanged { step: next });
        }
    }

    /// Move back one step, clamped to the first step.
    ///
    pub fn retreat_step(&mut self) {
        let previous = self.current_step.saturating_sub(1).max(1);
        if previous != self.current_step {
            self.current_step = previous;
            self.publish(SessionEvent::StepChanged { step: previous });
        }
    }

    /// Jump to a step. Out-of-range targets are silently ignored.
    ///
    pub fn go_to_step(&mut self, step: usize) {
        if step < 1 || step > self.total_steps {
            debug!("Ignoring navigation to out-of-range step {}", step);
            return;
        }
        if step != self.current_step {
            self.current_step = step;
            self.publish(SessionEvent::StepChanged { step });
        }
    }

    /// Record the reference returned by a successful submission.
    ///
    /// First write wins: a session keeps the reference it obtained first and
    /// only an explicit reset clears it.
    ///
    pub fn record_submission(&mut self, reference: &str) {
        if self.submission_id.is_some() {
            warn!("Ignoring second submission reference for this session");
            return;
        }
        self.submission_id = Some(reference.to_owned());
        self.publish(SessionEvent::SubmissionRecorded {
            reference: reference.to_owned(),
        });
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        if self.is_submitting != submitting {
            self.is_submitting = submitting;
            self.publish(SessionEvent::SubmittingChanged { submitting });
        }
    }

    /// Apply a loaded progress snapshot. The persisted step is clamped into
    /// range rather than rejected; the answers are applied wholesale.
    ///
    pub fn restore(&mut self, step: usize, answers: AnswerMap, submission_id: Option<String>) {
        self.current_step = step.clamp(1, self.total_steps);
        self.answers = answers;
        self.submission_id = submission_id;
        self.publish(SessionEvent::Restored);
    }

    /// Return to the initial state: first step, no answers, no submission
    /// reference, not submitting. Bumps the epoch.
    ///
    pub fn reset(&mut self) {
        self.current_step = 1;
        self.answers.clear();
        self.submission_id = None;
        self.is_submitting = false;
        self.epoch += 1;
        self.publish(SessionEvent::Reset);
    }

    fn publish(&self, event: SessionEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }
}

impl Default for FormSession {
    fn default() -> FormSession {
        FormSession::new()
    }
}
