//! Event publisher port for downstream notification and stats systems.

use crate::task::domain::TaskEvent;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for event publishing.
pub type TaskEventPublishResult = Result<(), TaskEventPublishError>;

/// Outbound channel for committed task events.
///
/// Publishing is best-effort: services log failures and never roll back
/// the transition that produced the event.
#[async_trait]
pub trait TaskEventPublisher: Send + Sync {
    /// Delivers a single event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskEventPublishError`] when delivery fails; the caller
    /// treats this as a reporting concern, not a transaction failure.
    async fn publish(&self, event: &TaskEvent) -> TaskEventPublishResult;
}

/// Failure delivering a task event.
#[derive(Debug, Clone, Error)]
#[error("event publish failed: {0}")]
pub struct TaskEventPublishError(Arc<dyn std::error::Error + Send + Sync>);

impl TaskEventPublishError {
    /// Wraps a delivery error.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
