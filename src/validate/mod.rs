//! Client-side answer validation.
//!
//! Validation is pure: rules map a question definition and the current
//! answer to a pass/fail decision plus a message. Per-field evaluation
//! order is fixed: required-ness first, then type-specific structural
//! rules, then any caller-provided custom rules in declared order, short-
//! circuiting on the first failure.
//!
//! Required-ness trims text before the emptiness check, uniformly: a
//! whitespace-only answer does not satisfy a required question.

use crate::form::{AnswerValue, QuestionDefinition, QuestionType};
use std::collections::{BTreeMap, HashMap};

pub mod validators;

/// Minimum length for non-empty textarea answers, in characters.
pub const MIN_DESCRIPTION_LENGTH: usize = 50;

/// Maximum length for textarea answers, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Ordered map from question id to the first failing rule's message.
/// Only failing ids appear.
///
pub type ValidationErrors = BTreeMap<String, String>;

/// A custom validation rule: a predicate over the raw answer plus the
/// message reported on failure.
///
pub struct Rule {
    message: String,
    check: Box<dyn Fn(Option<&AnswerValue>) -> bool + Send + Sync>,
}

impl Rule {
    /// Return a rule that fails with `message` when `check` returns false.
    ///
    pub fn new<F>(message: &str, check: F) -> Rule
    where
        F: Fn(Option<&AnswerValue>) -> bool + Send + Sync + 'static,
    {
        Rule {
            message: message.to_owned(),
            check: Box::new(check),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn passes(&self, value: Option<&AnswerValue>) -> bool {
        (self.check)(value)
    }
}

/// Custom rules keyed by question id, evaluated after the built-in rules.
///
pub type RuleTable = HashMap<String, Vec<Rule>>;

/// Standard failure messages.
///
pub mod messages {
    pub const REQUIRED: &str = "This field is required";
    pub const INVALID_DATE: &str = "Please enter a valid date";
    pub const INVALID_TIME: &str = "Please enter a valid time";
    pub const UNKNOWN_OPTION: &str = "Answer is not one of the available options";
    pub const INVALID_EMAIL: &str = "Please enter a valid email address";
    pub const INVALID_URL: &str = "Please enter a valid URL";
    pub const PAST_DATE: &str = "Date must be in the past";
    pub const UNSAFE_TEXT: &str = "Input contains potentially unsafe content";
    pub const INVALID_REFERENCE_CODE: &str = "Please enter a valid reference code";

    pub fn min_length(min: usize) -> String {
        format!("Must be at least {} characters", min)
    }

    pub fn max_length(max: usize) -> String {
        format!("Must be no more than {} characters", max)
    }
}

/// Whether the answer counts as empty for required-ness purposes.
///
fn is_blank(value: Option<&AnswerValue>) -> bool {
    value.map_or(true, AnswerValue::is_blank)
}

/// Evaluate a single question against its built-in and custom rules,
/// returning the first failing rule's message.
///
pub fn validate_field(
    question: &QuestionDefinition,
    value: Option<&AnswerValue>,
    custom_rules: &[Rule],
) -> Option<String> {
    if question.required && is_blank(value) {
        // A required choice question with zero declared options is a form
        // configuration error; there is nothing the user could select, so
        // it passes trivially instead of blocking the report.
        let unanswerable = question.question_type.uses_options() && question.options.is_empty();
        if !unanswerable {
            return Some(messages::REQUIRED.to_owned());
        }
    }

    if let Some(value) = value {
        if !value.is_blank() {
            if let Some(message) = structural_error(question, value) {
                return Some(message);
            }
        }
    }

    custom_rules
        .iter()
        .find(|rule| !rule.passes(value))
        .map(|rule| rule.message().to_owned())
}

/// Type-specific structural rules, applied only to non-empty values.
///
fn structural_error(question: &QuestionDefinition, value: &AnswerValue) -> Option<String> {
    match question.question_type {
        QuestionType::Textarea => {
            let text = value.as_text()?;
            let length = text.chars().count();
            if length < MIN_DESCRIPTION_LENGTH {
                Some(messages::min_length(MIN_DESCRIPTION_LENGTH))
            } else if length > MAX_DESCRIPTION_LENGTH {
                Some(messages::max_length(MAX_DESCRIPTION_LENGTH))
            } else {
                None
            }
        }
        QuestionType::Date => match value.as_text() {
            Some(text) if validators::date(text) => None,
            _ => Some(messages::INVALID_DATE.to_owned()),
        },
        QuestionType::Time => match value.as_text() {
            Some(text) if validators::time(text) => None,
            _ => Some(messages::INVALID_TIME.to_owned()),
        },
        QuestionType::Select | QuestionType::Radio => match value.as_text() {
            Some(text) if question.options.iter().any(|option| option == text) => None,
            _ => Some(messages::UNKNOWN_OPTION.to_owned()),
        },
        QuestionType::Checkbox => match value.as_selections() {
            Some(selections)
                if selections
                    .iter()
                    .all(|selected| question.options.iter().any(|option| option == selected)) =>
            {
                None
            }
            _ => Some(messages::UNKNOWN_OPTION.to_owned()),
        },
        QuestionType::Text => None,
    }
}

/// Evaluate every question, returning the complete map of failing ids.
/// A question with no applicable rules always passes.
///
pub fn validate_form(
    questions: &[QuestionDefinition],
    answers: &crate::form::AnswerMap,
    rules: &RuleTable,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for question in questions {
        let custom = rules.get(&question.id).map_or(&[][..], Vec::as_slice);
        if let Some(message) = validate_field(question, answers.get(&question.id), custom) {
            errors.insert(question.id.clone(), message);
        }
    }
    errors
}
