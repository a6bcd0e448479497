use core_types::AgentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Failed to build the HTTP client: {0}")]
    ClientBuild(String),

    #[error("The inference request timed out: {0}")]
    Timeout(String),

    #[error("Network error while calling the inference service: {0}")]
    Network(String),

    #[error("The inference quota is exhausted: {0}")]
    QuotaExceeded(String),

    #[error("The inference service is rate limiting requests: {0}")]
    RateLimited(String),

    #[error("The inference service failed with status {0}: {1}")]
    Service(u16, String),

    #[error("The inference service rejected the request with status {0}: {1}")]
    Rejected(u16, String),

    #[error("Failed to deserialize the inference response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Timeout(err.to_string())
        } else if err.is_decode() {
            InferenceError::InvalidResponse(err.to_string())
        } else {
            InferenceError::Network(err.to_string())
        }
    }
}

impl From<InferenceError> for AgentError {
    fn from(err: InferenceError) -> Self {
        let message = err.to_string();
        match err {
            InferenceError::ClientBuild(_) => AgentError::ai_service_error(message),
            InferenceError::Timeout(_) => AgentError::new(
                core_types::ErrorCode::TimeoutError,
                core_types::Severity::Medium,
                message,
            )
            .with_suggested_fix("The inference service is slow to answer. Try again shortly."),
            InferenceError::Network(_) => AgentError::network_error(message),
            InferenceError::QuotaExceeded(_) => AgentError::quota_exceeded_error(message),
            InferenceError::RateLimited(_) => AgentError::rate_limit_error(message),
            InferenceError::Service(status, _) => AgentError::ai_service_error(message)
                .with_details(serde_json::json!({ "httpStatus": status })),
            // A 4xx answers the same way on every attempt, so it must not be retried.
            InferenceError::Rejected(status, _) => AgentError::new(
                core_types::ErrorCode::ValidationError,
                core_types::Severity::High,
                message,
            )
            .with_details(serde_json::json!({ "httpStatus": status }))
            .with_suggested_fix("Check the inference API key, model name and request settings."),
            InferenceError::InvalidResponse(_) => AgentError::invalid_response_error(message),
        }
    }
}
