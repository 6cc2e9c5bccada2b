//! Question model for the incident report form.
//!
//! Question definitions are wire-compatible with the `questions` payload of
//! the forms API and immutable once loaded for a session. The built-in
//! report questionnaire is used whenever the active form cannot be fetched.

use fake::Dummy;
use serde::{Deserialize, Serialize};

/// Supported question input kinds.
///
#[derive(Clone, Copy, Debug, Dummy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Text,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
    Time,
}

impl QuestionType {
    /// Whether answers for this kind are picked from declared options.
    ///
    pub fn uses_options(&self) -> bool {
        matches!(
            self,
            QuestionType::Select | QuestionType::Radio | QuestionType::Checkbox
        )
    }

    /// Whether this kind accepts multiple selections at once.
    ///
    pub fn is_multi(&self) -> bool {
        matches!(self, QuestionType::Checkbox)
    }
}

/// Defines a single question within a form.
///
#[derive(Clone, Debug, Dummy, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDefinition {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
}

impl QuestionDefinition {
    /// Return a new question with no options or helper texts.
    ///
    pub fn new(
        id: &str,
        question: &str,
        question_type: QuestionType,
        required: bool,
    ) -> QuestionDefinition {
        QuestionDefinition {
            id: id.to_owned(),
            question: question.to_owned(),
            question_type,
            required,
            options: vec![],
            placeholder: None,
            helper_text: None,
        }
    }

    /// Set the declared options.
    ///
    pub fn with_options<S: Into<String>>(mut self, options: Vec<S>) -> QuestionDefinition {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Set the placeholder text.
    ///
    pub fn with_placeholder(mut self, placeholder: &str) -> QuestionDefinition {
        self.placeholder = Some(placeholder.to_owned());
        self
    }

    /// Set the helper text shown alongside the question.
    ///
    pub fn with_helper_text(mut self, helper_text: &str) -> QuestionDefinition {
        self.helper_text = Some(helper_text.to_owned());
        self
    }
}

/// Incident categories offered by the built-in questionnaire.
///
pub const INCIDENT_CATEGORIES: [&str; 9] = [
    "Verbal Harassment",
    "Physical Harassment",
    "Visual Harassment",
    "Digital/Online Harassment",
    "Quid Pro Quo",
    "Hostile Work Environment",
    "Stalking",
    "Sexual Assault",
    "Other",
];

/// Location types offered by the built-in questionnaire.
///
pub const INCIDENT_LOCATIONS: [&str; 7] = [
    "Workplace",
    "School/University",
    "Public Transport",
    "Online/Social Media",
    "Public Space",
    "Home",
    "Other",
];

/// Reporter-to-perpetrator relationships offered by the built-in
/// questionnaire.
///
pub const RELATIONSHIPS: [&str; 10] = [
    "Supervisor/Manager",
    "Colleague",
    "Subordinate",
    "Teacher/Instructor",
    "Classmate/Student",
    "Stranger",
    "Acquaintance",
    "Family Member",
    "Romantic Partner",
    "Other",
];

/// Follow-up actions offered by the built-in questionnaire.
///
pub const PREFERRED_ACTIONS: [&str; 7] = [
    "Formal Investigation",
    "Mediation",
    "Counseling Services",
    "Legal Action",
    "Awareness/Education",
    "Just Documenting",
    "Undecided",
];

/// Return the built-in incident report questionnaire.
///
/// Serves as the fallback question set when the active form definition
/// cannot be fetched from the API.
///
pub fn report_questions() -> Vec<QuestionDefinition> {
    vec![
        QuestionDefinition::new(
            "incidentCategory",
            "What type of harassment occurred?",
            QuestionType::Select,
            true,
        )
        .with_options(INCIDENT_CATEGORIES.to_vec())
        .with_helper_text("Select the category that best describes what happened"),
        QuestionDefinition::new(
            "incidentDescription",
            "Please describe what happened",
            QuestionType::Textarea,
            true,
        )
        .with_placeholder("Provide as much detail as you feel comfortable sharing...")
        .with_helper_text(
            "Include details such as what was said or done, how it made you feel, and any witnesses present",
        ),
        QuestionDefinition::new(
            "incidentDate",
            "When did this incident occur?",
            QuestionType::Date,
            true,
        )
        .with_helper_text("Select the date when the incident happened"),
        QuestionDefinition::new(
            "incidentTime",
            "Approximately what time did this occur?",
            QuestionType::Time,
            false,
        )
        .with_helper_text("If you remember, select the approximate time"),
        QuestionDefinition::new(
            "incidentLocation",
            "Where did this incident take place?",
            QuestionType::Select,
            true,
        )
        .with_options(INCIDENT_LOCATIONS.to_vec())
        .with_helper_text("Select the location type"),
        QuestionDefinition::new(
            "locationDetails",
            "Can you provide more details about the location?",
            QuestionType::Text,
            false,
        )
        .with_placeholder("e.g., Third floor office, Conference Room B, etc.")
        .with_helper_text("Optional: Provide specific location details if you feel comfortable"),
        QuestionDefinition::new(
            "relationshipToPerpetrator",
            "What is your relationship to the person who did this?",
            QuestionType::Select,
            true,
        )
        .with_options(RELATIONSHIPS.to_vec())
        .with_helper_text("Select the relationship that applies"),
        QuestionDefinition::new(
            "isOngoing",
            "Is this harassment ongoing?",
            QuestionType::Radio,
            true,
        )
        .with_options(vec!["Yes", "No", "Unsure"])
        .with_helper_text("Let us know if this continues to happen"),
        QuestionDefinition::new(
            "hasWitnesses",
            "Were there any witnesses?",
            QuestionType::Radio,
            false,
        )
        .with_options(vec!["Yes", "No", "Unsure"]),
        QuestionDefinition::new(
            "witnessDetails",
            "If there were witnesses, can you provide any details?",
            QuestionType::Textarea,
            false,
        )
        .with_placeholder("Names, descriptions, or any other relevant information...")
        .with_helper_text("Optional: Share witness information only if you feel comfortable"),
        QuestionDefinition::new(
            "previouslyReported",
            "Have you reported this incident before?",
            QuestionType::Radio,
            false,
        )
        .with_options(vec!["Yes", "No"]),
        QuestionDefinition::new(
            "previousReportDetails",
            "If yes, where and when did you report it?",
            QuestionType::Textarea,
            false,
        )
        .with_placeholder("Provide details about your previous report..."),
        QuestionDefinition::new(
            "preferredAction",
            "What would you like to happen as a result of this report?",
            QuestionType::Checkbox,
            false,
        )
        .with_options(PREFERRED_ACTIONS.to_vec())
        .with_helper_text("Select all that apply"),
        QuestionDefinition::new(
            "additionalInformation",
            "Is there anything else you would like us to know?",
            QuestionType::Textarea,
            false,
        )
        .with_placeholder("Any additional context or information...")
        .with_helper_text("Optional: Share any other relevant details"),
    ]
}
