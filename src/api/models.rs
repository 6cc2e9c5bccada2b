//! Wire models for the reports API.
//!
//! All payloads are camelCase JSON. Date-time fields arrive as ISO-8601
//! strings and are kept as strings; the engine never does arithmetic on
//! them.

use crate::form::{AnswerMap, QuestionDefinition};
use fake::Dummy;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a stored response.
///
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Draft,
    Submitted,
    Reviewed,
    #[serde(other)]
    Unknown,
}

/// Request body for creating a response.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponsePayload {
    pub form_id: String,
    pub data: AnswerMap,
}

/// Stored response as returned by the API.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub id: String,
    pub form_id: String,
    #[serde(default)]
    pub data: AnswerMap,
    #[serde(default)]
    pub reference_code: Option<String>,
    #[serde(default)]
    pub status: Option<ResponseStatus>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Outcome of a successful submission.
///
/// The reference code falls back to the internal id when the server did not
/// assign one, so callers always have something to show the reporter.
#[derive(Clone, Debug, Dummy, PartialEq)]
pub struct Submission {
    pub id: String,
    pub reference_code: String,
    pub submitted_at: Option<String>,
}

impl From<ResponseData> for Submission {
    fn from(response: ResponseData) -> Submission {
        let reference_code = response
            .reference_code
            .unwrap_or_else(|| response.id.clone());
        Submission {
            id: response.id,
            reference_code,
            submitted_at: response.submitted_at,
        }
    }
}

/// Active form definition with its questionnaire.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionDefinition>,
    #[serde(default)]
    pub is_active: bool,
}
