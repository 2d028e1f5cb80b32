//! Service layer mediating provider interest and direct requests.
//!
//! Two matching flows converge on the same `matched` state: any provider
//! may express interest in a floating task, while a customer may invite a
//! specific provider directly. Both end with exactly one provider bound to
//! the task.

use super::emit_best_effort;
use crate::task::{
    domain::{
        CustomerId, MatchOutcome, ProviderId, Task, TaskDomainError, TaskEvent, TaskId,
    },
    ports::{TaskEventPublisher, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for matching operations.
#[derive(Debug, Error)]
pub enum MatchingError {
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

/// Result type for matching service operations.
pub type MatchingResult<T> = Result<T, MatchingError>;

/// Matching orchestration service.
///
/// Shares the repository, event publisher, and clock with the lifecycle
/// service; each operation is a single optimistic read-modify-write cycle
/// against one task.
#[derive(Clone)]
pub struct MatchingService<R, P, C>
where
    R: TaskRepository,
    P: TaskEventPublisher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    events: Arc<P>,
    clock: Arc<C>,
}

impl<R, P, C> MatchingService<R, P, C>
where
    R: TaskRepository,
    P: TaskEventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a new matching service.
    #[must_use]
    pub const fn new(repository: Arc<R>, events: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            repository,
            events,
            clock,
        }
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> MatchingResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(MatchingError::NotFound(task_id))
    }

    /// Records a provider's interest in a floating task.
    ///
    /// Duplicate interest is an idempotent no-op: nothing is persisted and
    /// no event is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::NotFound`] for an unknown task and
    /// [`TaskDomainError::NotFloating`] when the task is not open to the
    /// market.
    pub async fn express_interest(
        &self,
        task_id: TaskId,
        provider_id: ProviderId,
    ) -> MatchingResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        let prior_state = task.state();
        let recorded = task.express_interest(provider_id, &*self.clock)?;
        if recorded {
            self.repository.update(&task, prior_state).await?;
            emit_best_effort(
                &*self.events,
                TaskEvent::InterestExpressed {
                    task_id,
                    provider_id,
                    occurred_at: task.updated_at(),
                },
            )
            .await;
        }
        Ok(task)
    }

    /// Selects a provider on behalf of the owning customer.
    ///
    /// An interested provider is matched immediately; any other provider
    /// receives a direct request pending their acceptance. Re-requesting
    /// the provider of the pending request is an idempotent no-op: nothing
    /// is persisted and no event is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::NotFound`] for an unknown task and domain
    /// errors for non-owners or tasks past the matching phase.
    pub async fn request_provider(
        &self,
        task_id: TaskId,
        customer_id: CustomerId,
        provider_id: ProviderId,
    ) -> MatchingResult<(Task, MatchOutcome)> {
        let mut task = self.find_task_or_error(task_id).await?;
        let prior_state = task.state();
        let Some(outcome) = task.request_provider(customer_id, provider_id, &*self.clock)? else {
            return Ok((task, MatchOutcome::Requested));
        };
        self.repository.update(&task, prior_state).await?;
        let event = match outcome {
            MatchOutcome::Matched => TaskEvent::Matched {
                task_id,
                provider_id,
                occurred_at: task.updated_at(),
            },
            MatchOutcome::Requested => TaskEvent::ProviderRequested {
                task_id,
                provider_id,
                occurred_at: task.updated_at(),
            },
        };
        emit_best_effort(&*self.events, event).await;
        Ok((task, outcome))
    }

    /// Accepts a pending direct request on behalf of the addressed
    /// provider, binding them to the task.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::NotFound`] for an unknown task,
    /// [`TaskDomainError::NotRequestedProvider`] for any other provider,
    /// and [`TaskRepositoryError::ConcurrentModification`] when the task
    /// left the requested state between read and write.
    pub async fn accept_request(
        &self,
        task_id: TaskId,
        provider_id: ProviderId,
    ) -> MatchingResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        let prior_state = task.state();
        task.accept_request(provider_id, &*self.clock)?;
        self.repository.update(&task, prior_state).await?;
        emit_best_effort(
            &*self.events,
            TaskEvent::Matched {
                task_id,
                provider_id,
                occurred_at: task.updated_at(),
            },
        )
        .await;
        Ok(task)
    }

    /// Declines a pending direct request on behalf of the addressed
    /// provider, reopening the task to the market.
    ///
    /// # Errors
    ///
    /// Same guards as [`MatchingService::accept_request`].
    pub async fn decline_request(
        &self,
        task_id: TaskId,
        provider_id: ProviderId,
        reason: impl Into<String> + Send,
    ) -> MatchingResult<Task> {
        let mut task = self.find_task_or_error(task_id).await?;
        let prior_state = task.state();
        let decline_reason = reason.into();
        task.decline_request(provider_id, decline_reason.clone(), &*self.clock)?;
        self.repository.update(&task, prior_state).await?;
        emit_best_effort(
            &*self.events,
            TaskEvent::RequestDeclined {
                task_id,
                provider_id,
                reason: decline_reason,
                occurred_at: task.updated_at(),
            },
        )
        .await;
        Ok(task)
    }
}
