use core_types::AgentError;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Sink for every error the orchestrator classifies.
///
/// Shared by all runs that hold the same `Arc`, so entries from concurrent
/// tasks interleave in arrival order.
pub trait ErrorLog: Send + Sync {
    fn record(&self, error: AgentError);

    /// Up to `limit` entries, oldest first.
    fn recent(&self, limit: usize) -> Vec<AgentError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A bounded in-memory log that evicts its oldest entry once full.
#[derive(Debug)]
pub struct RingBufferErrorLog {
    capacity: usize,
    entries: Mutex<VecDeque<AgentError>>,
}

impl RingBufferErrorLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // A panic while holding the lock cannot leave the deque half-updated.
    fn entries(&self) -> MutexGuard<'_, VecDeque<AgentError>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ErrorLog for RingBufferErrorLog {
    fn record(&self, error: AgentError) {
        tracing::warn!(
            code = %error.code,
            severity = %error.severity,
            agent_id = error.agent_id.as_deref().unwrap_or("-"),
            "{}",
            error.message
        );

        let mut entries = self.entries();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(error);
    }

    fn recent(&self, limit: usize) -> Vec<AgentError> {
        let entries = self.entries();
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    fn len(&self) -> usize {
        self.entries().len()
    }
}
