//! Answer value types.
//!
//! Answers are either free text (text, textarea, select, radio, date, time
//! questions) or an ordered list of selections (checkbox questions). The
//! untagged serde representation keeps the persisted and wire `data` objects
//! as plain `string | string[]` JSON.

use fake::Dummy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Answer payload for a single question.
///
#[derive(Clone, Debug, Dummy, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Selections(Vec<String>),
}

impl AnswerValue {
    /// Whether the answer carries no content.
    ///
    /// Text is trimmed before the emptiness check; a string of spaces is
    /// treated the same as an absent answer.
    ///
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::Selections(selections) => selections.is_empty(),
        }
    }

    /// Return the text content, if this is a text answer.
    ///
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            AnswerValue::Selections(_) => None,
        }
    }

    /// Return the selection list, if this is a multi-selection answer.
    ///
    pub fn as_selections(&self) -> Option<&[String]> {
        match self {
            AnswerValue::Text(_) => None,
            AnswerValue::Selections(selections) => Some(selections),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(text: &str) -> AnswerValue {
        AnswerValue::Text(text.to_owned())
    }
}

impl From<String> for AnswerValue {
    fn from(text: String) -> AnswerValue {
        AnswerValue::Text(text)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(selections: Vec<String>) -> AnswerValue {
        AnswerValue::Selections(selections)
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(selections: Vec<&str>) -> AnswerValue {
        AnswerValue::Selections(selections.into_iter().map(str::to_owned).collect())
    }
}

/// Mapping from question id to the current answer. An absent key means the
/// question is unanswered.
///
pub type AnswerMap = HashMap<String, AnswerValue>;

/// Toggle one option within a checkbox answer.
///
/// A present option is removed, an absent option is appended; the relative
/// order of the remaining selections is preserved. A missing or text-typed
/// current value is treated as an empty selection list.
///
pub fn toggle_selection(answers: &mut AnswerMap, question_id: &str, option: &str) {
    let mut selections = match answers.get(question_id) {
        Some(AnswerValue::Selections(current)) => current.clone(),
        _ => vec![],
    };

    match selections.iter().position(|selected| selected == option) {
        Some(index) => {
            selections.remove(index);
        }
        None => selections.push(option.to_owned()),
    }

    answers.insert(question_id.to_owned(), AnswerValue::Selections(selections));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(AnswerValue::from("").is_blank());
        assert!(AnswerValue::from("   ").is_blank());
        assert!(AnswerValue::Selections(vec![]).is_blank());
        assert!(!AnswerValue::from("answer").is_blank());
        assert!(!AnswerValue::from(vec!["A"]).is_blank());
    }

    #[test]
    fn test_accessors() {
        let text = AnswerValue::from("hello");
        assert_eq!(text.as_text(), Some("hello"));
        assert!(text.as_selections().is_none());

        let multi = AnswerValue::from(vec!["A", "B"]);
        assert!(multi.as_text().is_none());
        assert_eq!(multi.as_selections().unwrap().len(), 2);
    }

    #[test]
    fn test_toggle_selection() {
        let mut answers = AnswerMap::new();
        answers.insert("actions".to_owned(), AnswerValue::from(vec!["A"]));

        toggle_selection(&mut answers, "actions", "B");
        assert_eq!(answers["actions"], AnswerValue::from(vec!["A", "B"]));

        toggle_selection(&mut answers, "actions", "A");
        assert_eq!(answers["actions"], AnswerValue::from(vec!["B"]));
    }

    #[test]
    fn test_toggle_selection_starts_empty() {
        let mut answers = AnswerMap::new();
        toggle_selection(&mut answers, "actions", "Mediation");
        assert_eq!(answers["actions"], AnswerValue::from(vec!["Mediation"]));
    }

    #[test]
    fn test_toggle_selection_replaces_text_value() {
        let mut answers = AnswerMap::new();
        answers.insert("actions".to_owned(), AnswerValue::from("stray text"));
        toggle_selection(&mut answers, "actions", "A");
        assert_eq!(answers["actions"], AnswerValue::from(vec!["A"]));
    }

    #[test]
    fn test_untagged_serde_round_trip() {
        let mut answers = AnswerMap::new();
        answers.insert("description".to_owned(), AnswerValue::from("what happened"));
        answers.insert("actions".to_owned(), AnswerValue::from(vec!["A", "B"]));

        let json = serde_json::to_string(&answers).unwrap();
        let parsed: AnswerMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, answers);

        let raw: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(raw["description"].is_string());
        assert!(raw["actions"].is_array());
    }
}
