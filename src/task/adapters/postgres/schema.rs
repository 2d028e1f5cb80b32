//! Diesel schema for task lifecycle persistence.

diesel::table! {
    /// Marketplace task records.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Owning customer identifier.
        customer_id -> Uuid,
        /// Descriptive payload: title, description, location, schedule.
        details -> Jsonb,
        /// Task lifecycle state.
        #[max_length = 50]
        state -> Varchar,
        /// Provider matched to the task, if any.
        matched_provider_id -> Nullable<Uuid>,
        /// Provider addressed by a pending direct request, if any.
        requested_provider_id -> Nullable<Uuid>,
        /// Interest expressions in arrival order.
        interested_providers -> Jsonb,
        /// Declined-request audit records.
        decline_history -> Jsonb,
        /// Which side cancelled the task, if cancelled.
        #[max_length = 20]
        cancelled_by -> Nullable<Varchar>,
        /// Recorded cancellation reason, if cancelled.
        cancel_reason -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Publication timestamp, if published.
        published_at -> Nullable<Timestamptz>,
        /// Match timestamp, if matched.
        matched_at -> Nullable<Timestamptz>,
        /// Work-start timestamp, if started.
        started_at -> Nullable<Timestamptz>,
        /// Completion timestamp, if completed.
        completed_at -> Nullable<Timestamptz>,
        /// Cancellation timestamp, if cancelled.
        cancelled_at -> Nullable<Timestamptz>,
    }
}
