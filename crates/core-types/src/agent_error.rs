use crate::enums::{ErrorCode, Severity};
use crate::error::CoreError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The only error shape a caller of the pipeline ever sees.
///
/// Values are immutable once built: the builder methods consume `self` and
/// are meant to be chained right after construction.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("[{code}] {message}")]
pub struct AgentError {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl AgentError {
    pub fn new(code: ErrorCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            details: None,
            suggested_fix: None,
            timestamp: Utc::now().timestamp_millis(),
            agent_id: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_suggested_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    // --- Dedicated constructors ---

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, Severity::Low, message)
            .with_suggested_fix("Check the submitted trades, returns and summary values and resubmit.")
    }

    pub fn timeout_error(timeout_ms: u64) -> Self {
        Self::new(
            ErrorCode::TimeoutError,
            Severity::Medium,
            format!("Operation timed out after {timeout_ms}ms"),
        )
        .with_details(serde_json::json!({ "timeoutMs": timeout_ms }))
        .with_suggested_fix("Try again with a smaller data set or a longer timeout.")
    }

    pub fn quota_exceeded_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AiQuotaExceeded, Severity::High, message)
            .with_suggested_fix("The AI quota is exhausted. Wait for it to reset or use the offline analysis.")
    }

    pub fn data_fetch_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DataFetchError, Severity::Medium, message)
            .with_suggested_fix("Verify the data source is reachable and the requested range exists.")
    }

    pub fn rate_limit_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimitError, Severity::Medium, message)
            .with_suggested_fix("Too many requests were sent. Wait a moment before retrying.")
    }

    pub fn network_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, Severity::Medium, message)
            .with_suggested_fix("Check the network connection and the inference service address.")
    }

    pub fn ai_service_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AiServiceError, Severity::High, message)
            .with_suggested_fix("The AI service is unavailable. Try again later.")
    }

    pub fn invalid_response_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AiInvalidResponse, Severity::Medium, message)
            .with_suggested_fix("The AI service returned an unexpected response. Retrying usually helps.")
    }
}

impl From<CoreError> for AgentError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::InvalidInput(field, reason) => AgentError::validation_error(err.to_string())
                .with_details(serde_json::json!({ "field": field, "reason": reason })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_the_wire_shape() {
        let err = AgentError::timeout_error(50).with_agent_id("coach");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "TIMEOUT_ERROR");
        assert_eq!(json["severity"], "medium");
        assert_eq!(json["agentId"], "coach");
        assert_eq!(json["details"]["timeoutMs"], 50);
        assert!(json["suggestedFix"].is_string());
        assert!(json["timestamp"].is_i64());
    }

    #[test]
    fn omits_absent_optional_fields() {
        let err = AgentError::new(ErrorCode::UnknownError, Severity::Medium, "boom");
        let json = serde_json::to_value(&err).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("details"));
        assert!(!obj.contains_key("suggestedFix"));
        assert!(!obj.contains_key("agentId"));
    }

    #[test]
    fn dedicated_constructors_fix_code_and_severity() {
        assert_eq!(AgentError::validation_error("x").code, ErrorCode::ValidationError);
        assert_eq!(AgentError::validation_error("x").severity, Severity::Low);
        assert_eq!(AgentError::quota_exceeded_error("x").code, ErrorCode::AiQuotaExceeded);
        assert_eq!(AgentError::quota_exceeded_error("x").severity, Severity::High);
        assert_eq!(AgentError::data_fetch_error("x").code, ErrorCode::DataFetchError);
        assert!(AgentError::data_fetch_error("x").suggested_fix.is_some());
    }

    #[test]
    fn validation_and_quota_are_not_retryable() {
        assert!(!AgentError::validation_error("x").is_retryable());
        assert!(!AgentError::quota_exceeded_error("x").is_retryable());
        assert!(AgentError::timeout_error(1).is_retryable());
        assert!(AgentError::network_error("x").is_retryable());
    }

    #[test]
    fn core_error_becomes_validation_error() {
        let err: AgentError =
            CoreError::InvalidInput("returns[0]".into(), "must be finite".into()).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.details.unwrap()["field"], "returns[0]");
    }
}
