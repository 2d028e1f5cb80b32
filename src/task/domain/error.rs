//! Error types for task domain validation and state transitions.

use super::{CustomerId, ProviderId, TaskId, TaskState};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned by task domain operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task location is empty after trimming.
    #[error("task location must not be empty")]
    EmptyLocation,

    /// The schedule window ends before it starts.
    #[error("schedule must end after it starts: {starts_at} to {ends_at}")]
    InvalidSchedule {
        /// Start of the requested window.
        starts_at: DateTime<Utc>,
        /// End of the requested window.
        ends_at: DateTime<Utc>,
    },

    /// The patch carries no changes.
    #[error("task patch must change at least one field")]
    EmptyPatch,

    /// The caller is not the customer who owns the task.
    #[error("customer {customer_id} does not own task {task_id}")]
    NotTaskOwner {
        /// Task the caller attempted to mutate.
        task_id: TaskId,
        /// Customer that attempted the mutation.
        customer_id: CustomerId,
    },

    /// The caller is not the provider addressed by the pending request.
    #[error("provider {provider_id} is not the requested provider for task {task_id}")]
    NotRequestedProvider {
        /// Task with the pending request.
        task_id: TaskId,
        /// Provider that attempted to respond.
        provider_id: ProviderId,
    },

    /// The caller is not the provider matched to the task.
    #[error("provider {provider_id} is not the matched provider for task {task_id}")]
    NotMatchedProvider {
        /// Task the caller attempted to progress.
        task_id: TaskId,
        /// Provider that attempted the transition.
        provider_id: ProviderId,
    },

    /// The caller may not cancel the task.
    #[error("caller is neither the owning customer nor the matched provider of task {task_id}")]
    UnauthorizedCancellation {
        /// Task the caller attempted to cancel.
        task_id: TaskId,
    },

    /// Interest was expressed on a task that is not open to the market.
    #[error("task {task_id} is not floating (state: {state})")]
    NotFloating {
        /// Task the provider attempted to join.
        task_id: TaskId,
        /// Current lifecycle state.
        state: TaskState,
    },

    /// Publish was attempted on a task that has already left draft.
    #[error("task {task_id} is already published (state: {state})")]
    AlreadyPublished {
        /// Task the customer attempted to publish.
        task_id: TaskId,
        /// Current lifecycle state.
        state: TaskState,
    },

    /// Descriptive fields may only change before a provider is matched.
    #[error("task {task_id} is no longer editable (state: {state})")]
    NotEditable {
        /// Task the customer attempted to edit.
        task_id: TaskId,
        /// Current lifecycle state.
        state: TaskState,
    },

    /// Hard deletion is restricted to pre-match states.
    #[error("task {task_id} cannot be deleted (state: {state}); cancel it instead")]
    NotDeletable {
        /// Task the customer attempted to delete.
        task_id: TaskId,
        /// Current lifecycle state.
        state: TaskState,
    },

    /// The task has reached a terminal state and accepts no transitions.
    #[error("task {task_id} is in terminal state {state}")]
    TerminalState {
        /// Task that rejected the transition.
        task_id: TaskId,
        /// Terminal state the task is in.
        state: TaskState,
    },

    /// The requested transition is not an edge of the lifecycle graph.
    #[error("invalid state transition for task {task_id}: {from} to {to}")]
    InvalidStateTransition {
        /// Task that rejected the transition.
        task_id: TaskId,
        /// State the task was in.
        from: TaskState,
        /// State the transition targeted.
        to: TaskState,
    },
}

/// Error returned while parsing task states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);

/// Error returned while parsing cancellation actors from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown cancellation actor: {0}")]
pub struct ParseCancelledByError(pub String);
