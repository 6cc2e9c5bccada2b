//! HTTP client for reports API requests.
//!
//! This module provides a low-level HTTP client wrapper that applies the
//! request timeout and the bounded retry policy for transient failures,
//! returning raw responses for the high-level API to interpret.

use super::error::ApiError;
use log::*;
use reqwest::{Method, Response};
use std::time::Duration;

/// Request timeout applied to every attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base delay between attempts; the actual delay grows with the attempt
/// count.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Status codes considered safe to retry.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Whether a status code is on the transient allow-list.
///
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Delay before the next attempt; grows linearly with the attempt count.
///
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * (attempt + 1)
}

/// Makes requests to the reports API with timeout and retry applied.
///
pub struct Client {
    pub(crate) base_url: String,
    http_client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl Client {
    /// Returns a new instance for the given base URL and policy.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be created. This should never happen
    /// in practice as the builder is only given a request timeout.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Client {
        Client {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client - this should never happen"),
            max_retries,
            retry_delay,
        }
    }

    /// Make a request, retrying transient failures, and return the
    /// successful response.
    ///
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: &[(&str, &str)],
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt: u32 = 0;

        loop {
            let mut request = self.http_client.request(method.clone(), &url);
            for (name, value) in headers {
                request = request.header(*name, *value);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    if is_retryable_status(status.as_u16()) && attempt < self.max_retries {
                        let delay = backoff_delay(self.retry_delay, attempt);
                        warn!(
                            "Request to {} returned status {}; retrying in {:?} (attempt {} of {})",
                            url,
                            status,
                            delay,
                            attempt + 1,
                            self.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(Self::error_for_status(response, attempt).await);
                }
                Err(e) if e.is_timeout() => {
                    if attempt < self.max_retries {
                        let delay = backoff_delay(self.retry_delay, attempt);
                        warn!(
                            "Request to {} timed out; retrying in {:?} (attempt {} of {})",
                            url,
                            delay,
                            attempt + 1,
                            self.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    error!("Request to {} timed out after {} attempts", url, attempt + 1);
                    return Err(ApiError::Timeout);
                }
                Err(e) => {
                    error!("Request to {} failed: {}", url, e);
                    return Err(ApiError::Network(e));
                }
            }
        }
    }

    /// Map a failed response to the error taxonomy.
    ///
    async fn error_for_status(response: Response, attempts_used: u32) -> ApiError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("Unable to read response"));
        match status {
            404 => ApiError::NotFound,
            status if is_retryable_status(status) || status >= 500 => ApiError::Server {
                status,
                attempts: attempts_used + 1,
                message,
            },
            status => {
                error!("API request failed with status {}: {}", status, message);
                ApiError::Api { status, message }
            }
        }
    }
}
