//! Recording event publisher for assertions in tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::TaskEvent,
    ports::{TaskEventPublishError, TaskEventPublishResult, TaskEventPublisher},
};

/// Event publisher that captures every published event in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingTaskEventPublisher {
    events: Arc<RwLock<Vec<TaskEvent>>>,
}

impl RecordingTaskEventPublisher {
    /// Creates an empty recording publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the events published so far, in order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskEventPublishError`] when the internal lock is
    /// poisoned.
    pub fn recorded(&self) -> Result<Vec<TaskEvent>, TaskEventPublishError> {
        let events = self
            .events
            .read()
            .map_err(|err| TaskEventPublishError::new(std::io::Error::other(err.to_string())))?;
        Ok(events.clone())
    }
}

#[async_trait]
impl TaskEventPublisher for RecordingTaskEventPublisher {
    async fn publish(&self, event: &TaskEvent) -> TaskEventPublishResult {
        let mut events = self
            .events
            .write()
            .map_err(|err| TaskEventPublishError::new(std::io::Error::other(err.to_string())))?;
        events.push(event.clone());
        Ok(())
    }
}
