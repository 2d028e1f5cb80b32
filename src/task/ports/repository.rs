//! Repository port for task persistence and lookup.

use crate::task::domain::{CustomerId, ProviderId, Task, TaskId, TaskState};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Writes follow an optimistic-concurrency protocol: `update` and `delete`
/// commit only when the persisted lifecycle state still equals the state
/// the caller read, so at most one transition is applied to a task at a
/// time without cross-request locks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID
    /// already exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task, provided its persisted state
    /// still equals `expected_state`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist and [`TaskRepositoryError::ConcurrentModification`] when the
    /// optimistic precondition no longer holds.
    async fn update(&self, task: &Task, expected_state: TaskState) -> TaskRepositoryResult<()>;

    /// Removes a task, provided its persisted state still equals
    /// `expected_state`.
    ///
    /// # Errors
    ///
    /// Same contract as [`TaskRepository::update`].
    async fn delete(&self, id: TaskId, expected_state: TaskState) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns all tasks created by the given customer.
    async fn find_by_customer(&self, customer_id: CustomerId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns all tasks currently open to the market.
    async fn find_floating(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns all tasks the given provider is matched to.
    async fn find_by_matched_provider(
        &self,
        provider_id: ProviderId,
    ) -> TaskRepositoryResult<Vec<Task>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The optimistic write precondition failed: the task left the expected
    /// state between read and write. Callers should re-read before deciding
    /// whether the transition is still meaningful.
    #[error("task {task_id} concurrently modified; expected state {expected}")]
    ConcurrentModification {
        /// Task whose write was rejected.
        task_id: TaskId,
        /// State the caller expected the task to still be in.
        expected: TaskState,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
