use crate::error::InferenceError;
use async_trait::async_trait;
use configuration::InferenceSettings;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

pub mod error;
pub mod responses;
// --- Public API ---
pub use responses::{ApiErrorResponse, GenerateRequest, GenerateResponse, HealthStatus};

/// Markers in a 429 body that mean the account's quota is spent rather than
/// a transient throttle.
const QUOTA_MARKERS: [&str; 3] = ["quota", "billing", "insufficient_quota"];

/// The generic, abstract interface for a text-generation service.
/// The analyzer only ever talks to this trait, so the HTTP implementation
/// can be swapped for a scripted one in tests.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Sends a prompt and returns the raw generated text.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, InferenceError>;

    /// Checks that the service is reachable and answering.
    async fn health_check(&self) -> Result<HealthStatus, InferenceError>;
}

/// A concrete implementation of the `InferenceClient` over HTTP + JSON.
#[derive(Clone)]
pub struct HttpInferenceClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInferenceClient {
    pub fn new(settings: &InferenceSettings) -> Result<Self, InferenceError> {
        let mut headers = HeaderMap::new();
        if !settings.api_key.is_empty() {
            let value = HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
                .map_err(|e| InferenceError::ClientBuild(format!("Invalid API key: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| InferenceError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, InferenceError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text)
                .map_err(|e| InferenceError::InvalidResponse(format!("{}. Original text: {}", e, text)))
        } else {
            Err(classify_status(status, &text))
        }
    }
}

/// Maps a non-success HTTP status and its body onto an `InferenceError`.
fn classify_status(status: StatusCode, body: &str) -> InferenceError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| match e.code {
            Some(code) => format!("{}: {}", code, e.msg),
            None => e.msg,
        })
        .unwrap_or_else(|_| body.to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        let lowered = body.to_lowercase();
        if QUOTA_MARKERS.iter().any(|m| lowered.contains(m)) {
            InferenceError::QuotaExceeded(message)
        } else {
            InferenceError::RateLimited(message)
        }
    } else if status.is_server_error() {
        InferenceError::Service(status.as_u16(), message)
    } else {
        InferenceError::Rejected(status.as_u16(), message)
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, InferenceError> {
        let url = format!("{}/v1/generate", self.base_url);
        tracing::debug!(%url, prompt_len = request.prompt.len(), "Sending generate request");

        let response = self.client.post(&url).json(request).send().await?;
        Self::handle_response(response).await
    }

    async fn health_check(&self) -> Result<HealthStatus, InferenceError> {
        let url = format!("{}/v1/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_bodies_are_told_apart_from_throttling() {
        let quota = classify_status(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"code":"insufficient_quota","message":"You exceeded your current quota"}"#,
        );
        assert!(matches!(quota, InferenceError::QuotaExceeded(_)));

        let throttle = classify_status(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(throttle, InferenceError::RateLimited(m) if m == "slow down"));
    }

    #[test]
    fn server_and_client_errors_keep_their_status() {
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, ""),
            InferenceError::Service(502, _)
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, r#"{"error":"bad key"}"#),
            InferenceError::Rejected(401, m) if m == "bad key"
        ));
    }
}
