//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning customer identifier.
    pub customer_id: uuid::Uuid,
    /// Descriptive JSON payload.
    pub details: Value,
    /// Lifecycle state.
    pub state: String,
    /// Matched provider, if any.
    pub matched_provider_id: Option<uuid::Uuid>,
    /// Pending direct-request provider, if any.
    pub requested_provider_id: Option<uuid::Uuid>,
    /// Interest expressions JSON payload.
    pub interested_providers: Value,
    /// Declined-request audit JSON payload.
    pub decline_history: Value,
    /// Cancellation actor, if cancelled.
    pub cancelled_by: Option<String>,
    /// Cancellation reason, if cancelled.
    pub cancel_reason: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Publication timestamp, if published.
    pub published_at: Option<DateTime<Utc>>,
    /// Match timestamp, if matched.
    pub matched_at: Option<DateTime<Utc>>,
    /// Work-start timestamp, if started.
    pub started_at: Option<DateTime<Utc>>,
    /// Completion timestamp, if completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Cancellation timestamp, if cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning customer identifier.
    pub customer_id: uuid::Uuid,
    /// Descriptive JSON payload.
    pub details: Value,
    /// Lifecycle state.
    pub state: String,
    /// Matched provider, if any.
    pub matched_provider_id: Option<uuid::Uuid>,
    /// Pending direct-request provider, if any.
    pub requested_provider_id: Option<uuid::Uuid>,
    /// Interest expressions JSON payload.
    pub interested_providers: Value,
    /// Declined-request audit JSON payload.
    pub decline_history: Value,
    /// Cancellation actor, if cancelled.
    pub cancelled_by: Option<String>,
    /// Cancellation reason, if cancelled.
    pub cancel_reason: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Publication timestamp, if published.
    pub published_at: Option<DateTime<Utc>>,
    /// Match timestamp, if matched.
    pub matched_at: Option<DateTime<Utc>>,
    /// Work-start timestamp, if started.
    pub started_at: Option<DateTime<Utc>>,
    /// Completion timestamp, if completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Cancellation timestamp, if cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Update model for task records.
///
/// `None` writes SQL `NULL` rather than skipping the column: a cleared
/// `requested_provider_id` must actually clear the persisted value.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Descriptive JSON payload.
    pub details: Value,
    /// Lifecycle state.
    pub state: String,
    /// Matched provider, if any.
    pub matched_provider_id: Option<uuid::Uuid>,
    /// Pending direct-request provider, if any.
    pub requested_provider_id: Option<uuid::Uuid>,
    /// Interest expressions JSON payload.
    pub interested_providers: Value,
    /// Declined-request audit JSON payload.
    pub decline_history: Value,
    /// Cancellation actor, if cancelled.
    pub cancelled_by: Option<String>,
    /// Cancellation reason, if cancelled.
    pub cancel_reason: Option<String>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Publication timestamp, if published.
    pub published_at: Option<DateTime<Utc>>,
    /// Match timestamp, if matched.
    pub matched_at: Option<DateTime<Utc>>,
    /// Work-start timestamp, if started.
    pub started_at: Option<DateTime<Utc>>,
    /// Completion timestamp, if completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Cancellation timestamp, if cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
}
