//! Service layer for task creation and lifecycle transitions.

use super::emit_best_effort;
use crate::task::{
    domain::{
        CancelActor, CustomerId, ProviderId, Schedule, Task, TaskDetails, TaskDomainError,
        TaskEvent, TaskId, TaskPatch,
    },
    ports::{TaskEventPublisher, TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a draft task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    customer_id: CustomerId,
    title: String,
    description: Option<String>,
    location: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

impl CreateTaskRequest {
    /// Creates a request with required task fields.
    #[must_use]
    pub fn new(
        customer_id: CustomerId,
        title: impl Into<String>,
        location: impl Into<String>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_id,
            title: title.into(),
            description: None,
            location: location.into(),
            starts_at,
            ends_at,
        }
    }

    /// Sets the free-form task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation or transition guard failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Every mutation is a single read-modify-write cycle: load the task,
/// apply the domain transition, then persist with the loaded state as the
/// optimistic precondition. Collaborators are injected explicitly; there
/// are no module-level singletons.
#[derive(Clone)]
pub struct TaskLifecycleService<R, P, C>
where
    R: TaskRepository,
    P: TaskEventPublisher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    events: Arc<P>,
    clock: Arc<C>,
}

impl<R, P, C> TaskLifecycleService<R, P, C>
where
    R: TaskRepository,
    P: TaskEventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, events: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            repository,
            events,
            clock,
        }
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    /// Creates a new draft task owned by the requesting customer.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] when the title, location, or
    /// schedule is invalid, or [`TaskLifecycleError::Repository`] when
    /// persistence rejects the task.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let schedule = Schedule::new(request.starts_at, request.ends_at)?;
        let mut details = TaskDetails::new(request.title, request.location, schedule)?;
        if let Some(description) = request.description {
            details = details.with_description(description);
        }

        let task = Task::new(request.customer_id, details, &*self.clock);
        self.repository.store(&task).await?;
        emit_best_effort(
            &*self.events,
            TaskEvent::Created {
                task_id: task.id(),
                customer_id: task.customer_id(),
                occurred_at: task.created_at(),
            },
        )
        .await;
        Ok(task)
    }

    /// Publishes a draft task to the open market.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// domain errors for non-owners or tasks that already left draft.
    pub async fn publish_task(
        &self,
        task_id: TaskId,
        customer_id: CustomerId,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        let prior_state = task.state();
        task.publish(customer_id, &*self.clock)?;
        self.repository.update(&task, prior_state).await?;
        emit_best_effort(
            &*self.events,
            TaskEvent::Published {
                task_id,
                occurred_at: task.updated_at(),
            },
        )
        .await;
        Ok(task)
    }

    /// Applies a descriptive patch to a pre-match task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// domain errors for non-owners, post-match tasks, or invalid fields.
    pub async fn update_task(
        &self,
        task_id: TaskId,
        customer_id: CustomerId,
        patch: TaskPatch,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        let prior_state = task.state();
        task.apply_patch(customer_id, patch, &*self.clock)?;
        self.repository.update(&task, prior_state).await?;
        emit_best_effort(
            &*self.events,
            TaskEvent::Updated {
                task_id,
                occurred_at: task.updated_at(),
            },
        )
        .await;
        Ok(task)
    }

    /// Hard-deletes a pre-match task on behalf of its owner.
    ///
    /// Matched and later tasks must be cancelled instead so both sides
    /// keep a record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// domain errors for non-owners or post-match tasks.
    pub async fn delete_task(
        &self,
        task_id: TaskId,
        customer_id: CustomerId,
    ) -> TaskLifecycleResult<()> {
        let task = self.find_task_or_error(task_id).await?;
        task.ensure_deletable(customer_id)?;
        self.repository.delete(task_id, task.state()).await?;
        emit_best_effort(
            &*self.events,
            TaskEvent::Deleted {
                task_id,
                occurred_at: self.clock.utc(),
            },
        )
        .await;
        Ok(())
    }

    /// Starts work on a matched task on behalf of the matched provider.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// domain errors for non-matched providers or unmatched tasks.
    pub async fn start_task(
        &self,
        task_id: TaskId,
        provider_id: ProviderId,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        let prior_state = task.state();
        task.start(provider_id, &*self.clock)?;
        self.repository.update(&task, prior_state).await?;
        emit_best_effort(
            &*self.events,
            TaskEvent::Started {
                task_id,
                provider_id,
                occurred_at: task.updated_at(),
            },
        )
        .await;
        Ok(task)
    }

    /// Completes an in-progress task on behalf of the matched provider.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// domain errors when work was never started or the caller is not the
    /// matched provider.
    pub async fn complete_task(
        &self,
        task_id: TaskId,
        provider_id: ProviderId,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        let prior_state = task.state();
        task.complete(provider_id, &*self.clock)?;
        self.repository.update(&task, prior_state).await?;
        emit_best_effort(
            &*self.events,
            TaskEvent::Completed {
                task_id,
                provider_id,
                occurred_at: task.updated_at(),
            },
        )
        .await;
        Ok(task)
    }

    /// Cancels a task from any non-terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// domain errors for finished tasks or callers who are neither the
    /// owning customer nor the matched provider.
    pub async fn cancel_task(
        &self,
        task_id: TaskId,
        actor: CancelActor,
        reason: impl Into<String> + Send,
    ) -> TaskLifecycleResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        let prior_state = task.state();
        task.cancel(actor, reason, &*self.clock)?;
        self.repository.update(&task, prior_state).await?;
        if let Some(cancelled_by) = task.cancelled_by() {
            emit_best_effort(
                &*self.events,
                TaskEvent::Cancelled {
                    task_id,
                    cancelled_by,
                    reason: task.cancel_reason().unwrap_or_default().to_owned(),
                    occurred_at: task.updated_at(),
                },
            )
            .await;
        }
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence lookup
    /// fails.
    pub async fn find_task(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(task_id).await?)
    }

    /// Returns all tasks created by the given customer.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence lookup
    /// fails.
    pub async fn tasks_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_by_customer(customer_id).await?)
    }

    /// Returns all tasks currently open to the market.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence lookup
    /// fails.
    pub async fn floating_tasks(&self) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_floating().await?)
    }

    /// Returns all tasks the given provider is matched to.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence lookup
    /// fails.
    pub async fn tasks_for_matched_provider(
        &self,
        provider_id: ProviderId,
    ) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.find_by_matched_provider(provider_id).await?)
    }
}
