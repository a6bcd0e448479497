use core_types::AgentError;

/// What one attempt of a task produced. The orchestrator retries only
/// `Retryable` outcomes.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome<T> {
    Ok(T),
    Retryable(AgentError),
    Fatal(AgentError),
}

impl<T> TaskOutcome<T> {
    /// Sorts an error into `Retryable` or `Fatal` by its code.
    pub fn from_error(error: AgentError) -> Self {
        if error.is_retryable() {
            TaskOutcome::Retryable(error)
        } else {
            TaskOutcome::Fatal(error)
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, TaskOutcome::Ok(_))
    }
}

impl<T, E: Into<AgentError>> From<Result<T, E>> for TaskOutcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => TaskOutcome::Ok(value),
            Err(e) => TaskOutcome::from_error(e.into()),
        }
    }
}
