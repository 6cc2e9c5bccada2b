//! Submission client for the reports API.
//!
//! Wraps the low-level HTTP client with typed operations: creating a
//! response from a completed answer set, looking responses up by internal
//! id or human-shareable reference code, and fetching the active form
//! definition. Timeout and transient-failure retry are applied underneath;
//! callers see either a typed payload or an `ApiError`.

mod client;
mod error;
mod models;

pub use client::{
    backoff_delay, is_retryable_status, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT,
    RETRYABLE_STATUSES,
};
pub use error::ApiError;
pub use models::{CreateResponsePayload, FormDefinition, ResponseData, ResponseStatus, Submission};

use crate::form::AnswerMap;
use client::Client;
use log::*;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use reqwest::Method;
use std::time::Duration;

/// Header carrying the client-generated submission key. Retries of one
/// logical submission reuse the same key so a backend that honors it can
/// collapse duplicates.
///
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Generate a fresh idempotency key for one logical submission.
///
pub fn generate_idempotency_key() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Responsible for asynchronous interaction with the reports API including
/// transformation of response data into explicitly-defined types.
///
pub struct ReportApi {
    client: Client,
}

impl ReportApi {
    /// Returns a new instance for the given base URL with the default
    /// timeout and retry policy.
    ///
    pub fn new(base_url: &str) -> ReportApi {
        ReportApi::with_policy(
            base_url,
            DEFAULT_TIMEOUT,
            DEFAULT_MAX_RETRIES,
            DEFAULT_RETRY_DELAY,
        )
    }

    /// Returns a new instance with an explicit timeout and retry policy.
    ///
    pub fn with_policy(
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
        retry_delay: Duration,
    ) -> ReportApi {
        ReportApi {
            client: Client::new(base_url, timeout, max_retries, retry_delay),
        }
    }

    /// Create a response from the completed answer set, returning the
    /// stored submission with its reference code.
    ///
    /// The caller supplies the idempotency key and reuses it when manually
    /// retrying the same logical submission.
    ///
    pub async fn submit(
        &self,
        form_id: &str,
        answers: &AnswerMap,
        idempotency_key: &str,
    ) -> Result<Submission, ApiError> {
        debug!("Submitting response for form {}...", form_id);

        let payload = CreateResponsePayload {
            form_id: form_id.to_owned(),
            data: answers.clone(),
        };
        let body = serde_json::to_value(&payload)?;

        let response = self
            .client
            .request(
                Method::POST,
                "/responses",
                Some(&body),
                &[(IDEMPOTENCY_KEY_HEADER, idempotency_key)],
            )
            .await?;

        let data: ResponseData = Self::parse(response).await?;
        info!("Response stored with id {}", data.id);
        Ok(Submission::from(data))
    }

    /// Return a stored response by internal id.
    ///
    pub async fn fetch_response(&self, id: &str) -> Result<ResponseData, ApiError> {
        debug!("Requesting response {}...", id);
        let response = self
            .client
            .request(Method::GET, &format!("/responses/{}", id), None, &[])
            .await?;
        Self::parse(response).await
    }

    /// Return a stored response by its human-shareable reference code.
    ///
    pub async fn fetch_by_reference(&self, reference_code: &str) -> Result<ResponseData, ApiError> {
        debug!("Requesting response for reference {}...", reference_code);
        let response = self
            .client
            .request(
                Method::GET,
                &format!("/responses/reference/{}", reference_code),
                None,
                &[],
            )
            .await?;
        Self::parse(response).await
    }

    /// Return the currently active form definition with its questionnaire.
    ///
    pub async fn active_form(&self) -> Result<FormDefinition, ApiError> {
        debug!("Requesting active form definition...");
        let response = self
            .client
            .request(Method::GET, "/forms/active", None, &[])
            .await?;
        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let body = response.text().await.map_err(ApiError::Network)?;
        Ok(serde_json::from_str(&body)?)
    }
}
