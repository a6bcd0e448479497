use configuration::OrchestratorSettings;
use events::ProgressUpdate;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Receives every progress notification of a run.
pub type ProgressCallback = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Per-run knobs for the orchestrator.
#[derive(Clone)]
pub struct TaskConfig {
    /// Upper bound for a single attempt.
    pub timeout: Duration,
    /// Total attempt budget. Zero is treated as one.
    pub max_retries: u32,
    /// Backoff unit; attempt `n` waits `n * base_delay` before attempt `n + 1`.
    pub base_delay: Duration,
    pub on_progress: Option<ProgressCallback>,
}

impl TaskConfig {
    pub fn new(timeout: Duration, max_retries: u32) -> Self {
        Self {
            timeout,
            max_retries,
            ..Self::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    pub(crate) fn emit(&self, update: ProgressUpdate) {
        if let Some(callback) = &self.on_progress {
            callback(update);
        }
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            on_progress: None,
        }
    }
}

impl From<&OrchestratorSettings> for TaskConfig {
    fn from(settings: &OrchestratorSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            max_retries: settings.max_retries,
            base_delay: settings.base_delay(),
            on_progress: None,
        }
    }
}

impl fmt::Debug for TaskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskConfig")
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}
