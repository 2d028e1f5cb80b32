//! Domain events emitted after successful lifecycle transitions.
//!
//! Events feed downstream notification and statistics systems. They are
//! published best-effort: a failed publish never rolls back the transition
//! that produced it.

use super::{CancelledBy, CustomerId, ProviderId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain event describing a committed task state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// A customer created a draft task.
    Created {
        /// Task that was created.
        task_id: TaskId,
        /// Owning customer.
        customer_id: CustomerId,
        /// When the task was created.
        occurred_at: DateTime<Utc>,
    },
    /// A draft task was published to the open market.
    Published {
        /// Task that was published.
        task_id: TaskId,
        /// When the task was published.
        occurred_at: DateTime<Utc>,
    },
    /// A provider expressed interest in a floating task.
    InterestExpressed {
        /// Task the provider is interested in.
        task_id: TaskId,
        /// Interested provider.
        provider_id: ProviderId,
        /// When interest was recorded.
        occurred_at: DateTime<Utc>,
    },
    /// A customer sent a direct request to a provider.
    ProviderRequested {
        /// Task the request concerns.
        task_id: TaskId,
        /// Addressed provider.
        provider_id: ProviderId,
        /// When the request was sent.
        occurred_at: DateTime<Utc>,
    },
    /// The addressed provider declined a direct request.
    RequestDeclined {
        /// Task that reopened to the market.
        task_id: TaskId,
        /// Provider that declined.
        provider_id: ProviderId,
        /// Reason the provider gave.
        reason: String,
        /// When the request was declined.
        occurred_at: DateTime<Utc>,
    },
    /// Exactly one provider was bound to the task.
    Matched {
        /// Task that was matched.
        task_id: TaskId,
        /// Matched provider.
        provider_id: ProviderId,
        /// When the match was made.
        occurred_at: DateTime<Utc>,
    },
    /// The matched provider started work.
    Started {
        /// Task that moved to in-progress.
        task_id: TaskId,
        /// Matched provider.
        provider_id: ProviderId,
        /// When work started.
        occurred_at: DateTime<Utc>,
    },
    /// The matched provider completed the task.
    Completed {
        /// Task that was completed.
        task_id: TaskId,
        /// Matched provider.
        provider_id: ProviderId,
        /// When work completed.
        occurred_at: DateTime<Utc>,
    },
    /// The task was cancelled.
    Cancelled {
        /// Task that was cancelled.
        task_id: TaskId,
        /// Which side cancelled.
        cancelled_by: CancelledBy,
        /// Recorded cancellation reason.
        reason: String,
        /// When the task was cancelled.
        occurred_at: DateTime<Utc>,
    },
    /// Descriptive fields of a pre-match task were edited.
    Updated {
        /// Task that was edited.
        task_id: TaskId,
        /// When the edit was applied.
        occurred_at: DateTime<Utc>,
    },
    /// A pre-match task was hard-deleted by its owner.
    Deleted {
        /// Task that was removed.
        task_id: TaskId,
        /// When the task was removed.
        occurred_at: DateTime<Utc>,
    },
}

impl TaskEvent {
    /// Returns the task the event concerns.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        match self {
            Self::Created { task_id, .. }
            | Self::Published { task_id, .. }
            | Self::InterestExpressed { task_id, .. }
            | Self::ProviderRequested { task_id, .. }
            | Self::RequestDeclined { task_id, .. }
            | Self::Matched { task_id, .. }
            | Self::Started { task_id, .. }
            | Self::Completed { task_id, .. }
            | Self::Cancelled { task_id, .. }
            | Self::Updated { task_id, .. }
            | Self::Deleted { task_id, .. } => *task_id,
        }
    }

    /// Returns a stable identifier for the event kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Created { .. } => "task_created",
            Self::Published { .. } => "task_published",
            Self::InterestExpressed { .. } => "task_interest_expressed",
            Self::ProviderRequested { .. } => "task_provider_requested",
            Self::RequestDeclined { .. } => "task_request_declined",
            Self::Matched { .. } => "task_matched",
            Self::Started { .. } => "task_started",
            Self::Completed { .. } => "task_completed",
            Self::Cancelled { .. } => "task_cancelled",
            Self::Updated { .. } => "task_updated",
            Self::Deleted { .. } => "task_deleted",
        }
    }
}
