use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// The root configuration structure for the entire pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub orchestrator: OrchestratorSettings,
    pub error_log: ErrorLogSettings,
    pub inference: InferenceSettings,
    pub analysis: AnalysisSettings,
}

/// How a single task is driven: its deadline per attempt and its retry budget.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    /// Deadline for one attempt, in milliseconds.
    pub timeout_ms: u64,
    /// Total number of attempts, including the first.
    pub max_retries: u32,
    /// Backoff unit; attempt `n` waits `n * base_delay_ms` before the next one.
    pub base_delay_ms: u64,
}

impl OrchestratorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

/// Sizing of the in-memory error log shared by the orchestrator's tasks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ErrorLogSettings {
    /// Entries kept before the oldest are evicted.
    pub capacity: usize,
}

/// Connection and sampling parameters for the inference service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceSettings {
    pub base_url: String,
    /// Sent as a bearer token when not empty.
    pub api_key: String,
    /// Model name sent with every generate request.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Transport-level timeout for one HTTP request, in milliseconds.
    pub request_timeout_ms: u64,
}

impl InferenceSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Parameters of the analysis itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Reported as `agentId` on every envelope and error.
    pub agent_id: String,
    /// Observations needed before the sample counts as corroborating.
    pub min_sample_size: usize,
}

// --- Default Implementations ---
// These allow a user to omit any section from their toml and still have it
// work with sensible defaults. None of the numbers is load-bearing.

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 3,
            base_delay_ms: 1_000,
        }
    }
}

impl Default for ErrorLogSettings {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: String::new(),
            model: "default".to_string(),
            temperature: 0.3,
            max_tokens: 2048,
            request_timeout_ms: 60_000,
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            agent_id: "backtest-analyzer".to_string(),
            min_sample_size: 30,
        }
    }
}

impl Settings {
    /// Rejects values that would make the pipeline misbehave rather than fail loudly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        if self.orchestrator.timeout_ms == 0 {
            return invalid("orchestrator.timeout_ms must be greater than zero");
        }
        if self.orchestrator.max_retries == 0 {
            return invalid("orchestrator.max_retries must allow at least one attempt");
        }
        if self.error_log.capacity == 0 {
            return invalid("error_log.capacity must be greater than zero");
        }
        if !(0.0..=2.0).contains(&self.inference.temperature) {
            return invalid("inference.temperature must be between 0 and 2");
        }
        if self.inference.max_tokens == 0 {
            return invalid("inference.max_tokens must be greater than zero");
        }
        if self.inference.base_url.trim().is_empty() {
            return invalid("inference.base_url must not be empty");
        }
        if self.analysis.agent_id.trim().is_empty() {
            return invalid("analysis.agent_id must not be empty");
        }
        Ok(())
    }
}
