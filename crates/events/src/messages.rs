use crate::error::EventsError;
use chrono::Utc;
use core_types::AgentError;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a task as reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
    Error,
}

/// The outer shape every task resolves to.
///
/// On the wire it looks like:
/// `{
///   "status": "done",
///   "progress": 100,
///   "data": { ... },
///   "timestamp": 1718000000000,
///   "agentId": "backtest-analyzer"
/// }`
/// `data` is only present on `done`, `error` only on `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub status: TaskStatus,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AgentError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub agent_id: String,
}

impl<T> Envelope<T> {
    pub fn pending(agent_id: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Pending,
            progress: 0,
            data: None,
            error: None,
            explanation: None,
            timestamp: Utc::now().timestamp_millis(),
            agent_id: agent_id.into(),
        }
    }

    pub fn done(agent_id: impl Into<String>, data: T) -> Self {
        Self {
            status: TaskStatus::Done,
            progress: 100,
            data: Some(data),
            ..Self::pending(agent_id)
        }
    }

    pub fn failed(agent_id: impl Into<String>, error: AgentError) -> Self {
        Self {
            status: TaskStatus::Error,
            error: Some(error),
            ..Self::pending(agent_id)
        }
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = progress.min(100);
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn is_error(&self) -> bool {
        self.status == TaskStatus::Error
    }

    /// Rewraps the payload, keeping everything else.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Envelope<U> {
        Envelope {
            status: self.status,
            progress: self.progress,
            data: self.data.map(f),
            error: self.error,
            explanation: self.explanation,
            timestamp: self.timestamp,
            agent_id: self.agent_id,
        }
    }
}

impl<T: Serialize> Envelope<T> {
    pub fn to_json(&self) -> Result<String, EventsError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, EventsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One progress notification handed to a task's progress callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub status: TaskStatus,
    pub progress: u8,
    pub message: String,
    pub attempt: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ProgressUpdate {
    pub fn new(status: TaskStatus, progress: u8, attempt: u32, message: impl Into<String>) -> Self {
        Self {
            status,
            progress: progress.min(100),
            message: message.into(),
            attempt,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}
