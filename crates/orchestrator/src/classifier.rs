use core_types::{AgentError, ErrorCode, Severity};
use serde_json::Value;
use std::error::Error;
use std::io;
use tokio::time::error::Elapsed;

/// Turns arbitrary failures into the closed `AgentError` taxonomy.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    agent_id: String,
}

impl ErrorClassifier {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
        }
    }

    /// An `AgentError` anywhere in the source chain is returned unchanged.
    /// Otherwise the error is wrapped, tagged with this classifier's agent id,
    /// and `details` is attached.
    pub fn classify(&self, error: &(dyn Error + 'static), details: Option<Value>) -> AgentError {
        if let Some(typed) = find_in_chain::<AgentError>(error) {
            return typed.clone();
        }

        let message = error.to_string();
        let classified = if find_in_chain::<Elapsed>(error).is_some() {
            AgentError::new(ErrorCode::TimeoutError, Severity::Medium, message)
                .with_suggested_fix("Try again with a smaller data set or a longer timeout.")
        } else if find_in_chain::<io::Error>(error).is_some() {
            AgentError::network_error(message)
        } else {
            AgentError::new(ErrorCode::UnknownError, Severity::Medium, message)
                .with_suggested_fix("Retry the request. If it keeps failing, check the logs.")
        };

        let classified = classified.with_agent_id(self.agent_id.clone());
        match details {
            Some(details) => classified.with_details(details),
            None => classified,
        }
    }
}

fn find_in_chain<'a, E: Error + 'static>(error: &'a (dyn Error + 'static)) -> Option<&'a E> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(found) = err.downcast_ref::<E>() {
            return Some(found);
        }
        current = err.source();
    }
    None
}
