//! Reports API-specific error types.

/// Errors that can occur during API operations.
///
/// Transient failures (timeouts, retryable statuses) are retried inside the
/// client before any of these surface; `Server` therefore always means the
/// retry budget is spent.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request timed out after exhausting retries
    #[error("Request timed out")]
    Timeout,

    /// HTTP transport failed
    #[error("HTTP request failed: {0}")]
    Network(reqwest::Error),

    /// Lookup found nothing
    #[error("No response found for the given reference")]
    NotFound,

    /// Non-retryable client error
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Server error after exhausting retries
    #[error("Server error (status {status}) after {attempts} attempts: {message}")]
    Server {
        status: u16,
        attempts: u32,
        message: String,
    },

    /// Failed to deserialize API response
    #[error("Failed to deserialize API response: {0}")]
    Deserialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let error = ApiError::Timeout;
        assert!(error.to_string().contains("timed out"));

        let error = ApiError::NotFound;
        assert!(error.to_string().contains("No response found"));

        let error = ApiError::Api {
            status: 422,
            message: "Unprocessable".to_string(),
        };
        assert!(error.to_string().contains("422"));
        assert!(error.to_string().contains("Unprocessable"));

        let error = ApiError::Server {
            status: 503,
            attempts: 4,
            message: "Service unavailable".to_string(),
        };
        let error_str = error.to_string();
        assert!(error_str.contains("503"));
        assert!(error_str.contains("4 attempts"));
    }
}
