use crate::classifier::ErrorClassifier;
use crate::config::TaskConfig;
use crate::error_log::ErrorLog;
use crate::outcome::TaskOutcome;
use core_types::AgentError;
use events::{Envelope, ProgressUpdate, TaskStatus};
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Progress reported when an attempt starts.
pub const PROGRESS_STARTED: u8 = 10;
/// Progress reported after a failed attempt.
pub const PROGRESS_FAILED_ATTEMPT: u8 = 50;
/// Progress reported on success.
pub const PROGRESS_DONE: u8 = 100;

/// Runs a task under a timeout with bounded, linearly backed-off retries and
/// resolves it to an `Envelope`.
///
/// Attempts of one run are strictly sequential. The only state shared between
/// runs is the injected `ErrorLog`.
#[derive(Clone)]
pub struct Orchestrator {
    agent_id: String,
    error_log: Arc<dyn ErrorLog>,
    classifier: ErrorClassifier,
}

impl Orchestrator {
    pub fn new(agent_id: impl Into<String>, error_log: Arc<dyn ErrorLog>) -> Self {
        let agent_id = agent_id.into();
        Self {
            classifier: ErrorClassifier::new(agent_id.clone()),
            agent_id,
            error_log,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn error_log(&self) -> &Arc<dyn ErrorLog> {
        &self.error_log
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Drives `task` until it succeeds, fails fatally, or the attempt budget
    /// in `config` is spent. `task` is called once per attempt.
    pub async fn run<T, F, Fut>(&self, mut task: F, config: &TaskConfig) -> Envelope<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TaskOutcome<T>>,
    {
        let task_id = Uuid::new_v4();
        let attempts = config.attempts();
        let span = tracing::info_span!(
            "task",
            %task_id,
            agent_id = %self.agent_id,
            attempts
        );

        async {
            let mut attempt = 0;
            loop {
                attempt += 1;
                config.emit(ProgressUpdate::new(
                    TaskStatus::InProgress,
                    PROGRESS_STARTED,
                    attempt,
                    format!("Starting attempt {attempt} of {attempts}"),
                ));
                tracing::debug!(attempt, "Starting attempt");

                let (error, fatal) = match tokio::time::timeout(config.timeout, task()).await {
                    Ok(TaskOutcome::Ok(value)) => {
                        config.emit(ProgressUpdate::new(
                            TaskStatus::Done,
                            PROGRESS_DONE,
                            attempt,
                            "Completed",
                        ));
                        tracing::info!(attempt, "Task completed");
                        return Envelope::done(self.agent_id.clone(), value);
                    }
                    Ok(TaskOutcome::Retryable(e)) => (self.classifier.classify(&e, None), false),
                    Ok(TaskOutcome::Fatal(e)) => (self.classifier.classify(&e, None), true),
                    Err(_) => (self.timed_out(config, attempt), false),
                };

                self.error_log.record(error.clone());
                let last = fatal || attempt >= attempts;
                config.emit(ProgressUpdate::new(
                    if last { TaskStatus::Error } else { TaskStatus::InProgress },
                    PROGRESS_FAILED_ATTEMPT,
                    attempt,
                    error.message.clone(),
                ));

                if last {
                    tracing::error!(attempt, code = %error.code, fatal, "Task failed");
                    return self.failed(error);
                }

                let delay = config.base_delay * attempt;
                tracing::warn!(attempt, code = %error.code, ?delay, "Attempt failed, retrying");
                tokio::time::sleep(delay).await;
            }
        }
        .instrument(span)
        .await
    }

    fn timed_out(&self, config: &TaskConfig, attempt: u32) -> AgentError {
        let timeout_ms = u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX);
        AgentError::timeout_error(timeout_ms)
            .with_agent_id(self.agent_id.clone())
            .with_details(serde_json::json!({
                "timeoutMs": timeout_ms,
                "attempt": attempt,
            }))
    }

    fn failed<T>(&self, error: AgentError) -> Envelope<T> {
        Envelope::failed(self.agent_id.clone(), error).with_progress(PROGRESS_FAILED_ATTEMPT)
    }
}
