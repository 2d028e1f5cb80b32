//! Task aggregate root and lifecycle state machine.

use super::{
    CustomerId, ParseCancelledByError, ParseTaskStateError, ProviderId, TaskDetails,
    TaskDomainError, TaskId, TaskPatch,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Task has been created but is not yet visible to providers.
    Draft,
    /// Task is published on the open market, awaiting a match.
    Floating,
    /// Customer has invited a specific provider, awaiting a response.
    Requested,
    /// Exactly one provider is bound to the task, work not yet started.
    Matched,
    /// The matched provider is carrying out the task.
    InProgress,
    /// The matched provider finished the task.
    Completed,
    /// The task was called off by the customer or the matched provider.
    Cancelled,
}

impl TaskState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Floating => "floating",
            Self::Requested => "requested",
            Self::Matched => "matched",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` when no further transitions are permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns `true` when the lifecycle graph has an edge from `self` to
    /// `target`.
    ///
    /// Cancellation is reachable from every non-terminal state; all other
    /// edges move strictly forward.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Draft, Self::Floating)
            | (Self::Floating, Self::Requested | Self::Matched)
            | (Self::Requested, Self::Matched | Self::Floating)
            | (Self::Matched, Self::InProgress)
            | (Self::InProgress, Self::Completed) => true,
            (from, Self::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "draft" => Ok(Self::Draft),
            "floating" => Ok(Self::Floating),
            "requested" => Ok(Self::Requested),
            "matched" => Ok(Self::Matched),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}

/// Which side of the marketplace cancelled a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelledBy {
    /// The owning customer cancelled the task.
    Customer,
    /// The matched provider cancelled the task.
    Provider,
}

impl CancelledBy {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Provider => "provider",
        }
    }
}

impl TryFrom<&str> for CancelledBy {
    type Error = ParseCancelledByError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "provider" => Ok(Self::Provider),
            _ => Err(ParseCancelledByError(value.to_owned())),
        }
    }
}

/// Authenticated identity attempting to cancel a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelActor {
    /// A customer, authorized only for tasks they own.
    Customer(CustomerId),
    /// A provider, authorized only for tasks they are matched to.
    Provider(ProviderId),
}

/// Outcome of a customer selecting a provider for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The provider had already expressed interest and is now matched.
    Matched,
    /// The provider is awaiting the direct request and must accept it.
    Requested,
}

/// Audit record of a declined direct request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclineRecord {
    /// Provider that declined the request.
    pub provider_id: ProviderId,
    /// Reason the provider gave.
    pub reason: String,
    /// When the request was declined.
    pub declined_at: DateTime<Utc>,
}

/// Task aggregate root.
///
/// All mutating operations validate ownership and the lifecycle graph
/// before touching state; a rejected operation leaves the aggregate
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    customer_id: CustomerId,
    details: TaskDetails,
    state: TaskState,
    matched_provider_id: Option<ProviderId>,
    requested_provider_id: Option<ProviderId>,
    interested_providers: Vec<ProviderId>,
    decline_history: Vec<DeclineRecord>,
    cancelled_by: Option<CancelledBy>,
    cancel_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
    matched_at: Option<DateTime<Utc>>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning customer.
    pub customer_id: CustomerId,
    /// Persisted descriptive fields.
    pub details: TaskDetails,
    /// Persisted lifecycle state.
    pub state: TaskState,
    /// Persisted matched provider, if any.
    pub matched_provider_id: Option<ProviderId>,
    /// Persisted pending direct request, if any.
    pub requested_provider_id: Option<ProviderId>,
    /// Persisted interest expressions, in arrival order.
    pub interested_providers: Vec<ProviderId>,
    /// Persisted declined-request audit records.
    pub decline_history: Vec<DeclineRecord>,
    /// Persisted cancellation actor, if cancelled.
    pub cancelled_by: Option<CancelledBy>,
    /// Persisted cancellation reason, if cancelled.
    pub cancel_reason: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted publication timestamp, if published.
    pub published_at: Option<DateTime<Utc>>,
    /// Persisted match timestamp, if matched.
    pub matched_at: Option<DateTime<Utc>>,
    /// Persisted work-start timestamp, if started.
    pub started_at: Option<DateTime<Utc>>,
    /// Persisted completion timestamp, if completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted cancellation timestamp, if cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new draft task owned by the given customer.
    #[must_use]
    pub fn new(customer_id: CustomerId, details: TaskDetails, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            customer_id,
            details,
            state: TaskState::Draft,
            matched_provider_id: None,
            requested_provider_id: None,
            interested_providers: Vec::new(),
            decline_history: Vec::new(),
            cancelled_by: None,
            cancel_reason: None,
            created_at: timestamp,
            updated_at: timestamp,
            published_at: None,
            matched_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            customer_id: data.customer_id,
            details: data.details,
            state: data.state,
            matched_provider_id: data.matched_provider_id,
            requested_provider_id: data.requested_provider_id,
            interested_providers: data.interested_providers,
            decline_history: data.decline_history,
            cancelled_by: data.cancelled_by,
            cancel_reason: data.cancel_reason,
            created_at: data.created_at,
            updated_at: data.updated_at,
            published_at: data.published_at,
            matched_at: data.matched_at,
            started_at: data.started_at,
            completed_at: data.completed_at,
            cancelled_at: data.cancelled_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning customer.
    #[must_use]
    pub const fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the descriptive fields.
    #[must_use]
    pub const fn details(&self) -> &TaskDetails {
        &self.details
    }

    /// Returns the task lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the matched provider, if any.
    #[must_use]
    pub const fn matched_provider_id(&self) -> Option<ProviderId> {
        self.matched_provider_id
    }

    /// Returns the provider addressed by a pending direct request, if any.
    #[must_use]
    pub const fn requested_provider_id(&self) -> Option<ProviderId> {
        self.requested_provider_id
    }

    /// Returns providers that expressed interest, in arrival order.
    ///
    /// The list is a historical record: it is preserved after a match.
    #[must_use]
    pub fn interested_providers(&self) -> &[ProviderId] {
        &self.interested_providers
    }

    /// Returns audit records of declined direct requests.
    #[must_use]
    pub fn decline_history(&self) -> &[DeclineRecord] {
        &self.decline_history
    }

    /// Returns which side cancelled the task, if cancelled.
    #[must_use]
    pub const fn cancelled_by(&self) -> Option<CancelledBy> {
        self.cancelled_by
    }

    /// Returns the recorded cancellation reason, if cancelled.
    #[must_use]
    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the publication timestamp, if published.
    #[must_use]
    pub const fn published_at(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    /// Returns the match timestamp, if matched.
    #[must_use]
    pub const fn matched_at(&self) -> Option<DateTime<Utc>> {
        self.matched_at
    }

    /// Returns the work-start timestamp, if started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns the completion timestamp, if completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the cancellation timestamp, if cancelled.
    #[must_use]
    pub const fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    /// Publishes a draft task to the open market.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotTaskOwner`] for a non-owner,
    /// [`TaskDomainError::TerminalState`] for a finished task, and
    /// [`TaskDomainError::AlreadyPublished`] for any other non-draft state.
    pub fn publish(
        &mut self,
        customer_id: CustomerId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_owner(customer_id)?;
        self.ensure_not_terminal()?;
        if self.state != TaskState::Draft {
            return Err(TaskDomainError::AlreadyPublished {
                task_id: self.id,
                state: self.state,
            });
        }
        self.transition_to(TaskState::Floating, clock)
    }

    /// Records a provider's non-binding interest in a floating task.
    ///
    /// Duplicate interest is an idempotent no-op; `Ok(false)` signals that
    /// nothing changed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotFloating`] when the task is not open to
    /// the market, including once a provider has been matched.
    pub fn express_interest(
        &mut self,
        provider_id: ProviderId,
        clock: &impl Clock,
    ) -> Result<bool, TaskDomainError> {
        if self.state != TaskState::Floating {
            return Err(TaskDomainError::NotFloating {
                task_id: self.id,
                state: self.state,
            });
        }
        if self.interested_providers.contains(&provider_id) {
            return Ok(false);
        }
        self.interested_providers.push(provider_id);
        self.touch(clock);
        Ok(true)
    }

    /// Selects a provider on behalf of the owning customer.
    ///
    /// A provider that already expressed interest is matched immediately.
    /// Any other provider receives a direct request and must accept it
    /// before the task is matched. A pending request may be superseded by
    /// requesting a different provider; re-requesting the same provider is
    /// an idempotent no-op, signalled by `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotTaskOwner`] for a non-owner,
    /// [`TaskDomainError::TerminalState`] for a finished task, and
    /// [`TaskDomainError::InvalidStateTransition`] when the task is neither
    /// floating nor awaiting a request response.
    pub fn request_provider(
        &mut self,
        customer_id: CustomerId,
        provider_id: ProviderId,
        clock: &impl Clock,
    ) -> Result<Option<MatchOutcome>, TaskDomainError> {
        self.ensure_owner(customer_id)?;
        self.ensure_not_terminal()?;
        if !matches!(self.state, TaskState::Floating | TaskState::Requested) {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.state,
                to: TaskState::Requested,
            });
        }
        if self.state == TaskState::Requested && self.requested_provider_id == Some(provider_id) {
            return Ok(None);
        }
        if self.interested_providers.contains(&provider_id) {
            self.requested_provider_id = None;
            self.set_matched(provider_id, clock)?;
            return Ok(Some(MatchOutcome::Matched));
        }
        self.requested_provider_id = Some(provider_id);
        if self.state == TaskState::Floating {
            self.transition_to(TaskState::Requested, clock)?;
        } else {
            self.touch(clock);
        }
        Ok(Some(MatchOutcome::Requested))
    }

    /// Accepts a pending direct request on behalf of the addressed provider.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TerminalState`] for a finished task,
    /// [`TaskDomainError::InvalidStateTransition`] when no request is
    /// pending, and [`TaskDomainError::NotRequestedProvider`] when the
    /// caller is not the provider the request addresses.
    pub fn accept_request(
        &mut self,
        provider_id: ProviderId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_pending_request(provider_id, TaskState::Matched)?;
        self.requested_provider_id = None;
        self.set_matched(provider_id, clock)
    }

    /// Declines a pending direct request on behalf of the addressed
    /// provider, reopening the task to the market.
    ///
    /// The decline and its reason are kept for audit.
    ///
    /// # Errors
    ///
    /// Same guards as [`Task::accept_request`].
    pub fn decline_request(
        &mut self,
        provider_id: ProviderId,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_pending_request(provider_id, TaskState::Floating)?;
        self.requested_provider_id = None;
        self.decline_history.push(DeclineRecord {
            provider_id,
            reason: reason.into(),
            declined_at: clock.utc(),
        });
        self.transition_to(TaskState::Floating, clock)
    }

    /// Starts work on a matched task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TerminalState`] for a finished task,
    /// [`TaskDomainError::NotMatchedProvider`] when the caller is not the
    /// matched provider, and [`TaskDomainError::InvalidStateTransition`]
    /// when the task is not matched.
    pub fn start(
        &mut self,
        provider_id: ProviderId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_not_terminal()?;
        self.ensure_matched_provider(provider_id)?;
        self.transition_to(TaskState::InProgress, clock)
    }

    /// Completes an in-progress task.
    ///
    /// # Errors
    ///
    /// Same guards as [`Task::start`]; completion additionally requires
    /// that work was started first.
    pub fn complete(
        &mut self,
        provider_id: ProviderId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_not_terminal()?;
        self.ensure_matched_provider(provider_id)?;
        self.transition_to(TaskState::Completed, clock)
    }

    /// Cancels the task from any non-terminal state.
    ///
    /// Only the owning customer or the matched provider may cancel; the
    /// actor and reason are recorded.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::TerminalState`] for a finished task and
    /// [`TaskDomainError::UnauthorizedCancellation`] for any other actor.
    pub fn cancel(
        &mut self,
        actor: CancelActor,
        reason: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_not_terminal()?;
        let cancelled_by = match actor {
            CancelActor::Customer(customer_id) if customer_id == self.customer_id => {
                CancelledBy::Customer
            }
            CancelActor::Provider(provider_id)
                if self.matched_provider_id == Some(provider_id) =>
            {
                CancelledBy::Provider
            }
            CancelActor::Customer(_) | CancelActor::Provider(_) => {
                return Err(TaskDomainError::UnauthorizedCancellation { task_id: self.id });
            }
        };
        self.cancelled_by = Some(cancelled_by);
        self.cancel_reason = Some(reason.into());
        self.transition_to(TaskState::Cancelled, clock)
    }

    /// Applies a descriptive patch on behalf of the owning customer.
    ///
    /// Editing is restricted to pre-match states: a task that has moved
    /// past `floating` carries expectations both sides agreed to.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotTaskOwner`] for a non-owner,
    /// [`TaskDomainError::NotEditable`] past the floating state, and
    /// validation errors for invalid patched fields.
    pub fn apply_patch(
        &mut self,
        customer_id: CustomerId,
        patch: TaskPatch,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.ensure_owner(customer_id)?;
        if !matches!(self.state, TaskState::Draft | TaskState::Floating) {
            return Err(TaskDomainError::NotEditable {
                task_id: self.id,
                state: self.state,
            });
        }
        self.details.apply(patch)?;
        self.touch(clock);
        Ok(())
    }

    /// Verifies the owning customer may hard-delete the task.
    ///
    /// Deletion is restricted to pre-match states; anything later must be
    /// routed through cancellation so both sides keep a record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotTaskOwner`] for a non-owner and
    /// [`TaskDomainError::NotDeletable`] past the floating state.
    pub fn ensure_deletable(&self, customer_id: CustomerId) -> Result<(), TaskDomainError> {
        self.ensure_owner(customer_id)?;
        if !matches!(self.state, TaskState::Draft | TaskState::Floating) {
            return Err(TaskDomainError::NotDeletable {
                task_id: self.id,
                state: self.state,
            });
        }
        Ok(())
    }

    fn ensure_owner(&self, customer_id: CustomerId) -> Result<(), TaskDomainError> {
        if customer_id != self.customer_id {
            return Err(TaskDomainError::NotTaskOwner {
                task_id: self.id,
                customer_id,
            });
        }
        Ok(())
    }

    fn ensure_not_terminal(&self) -> Result<(), TaskDomainError> {
        if self.state.is_terminal() {
            return Err(TaskDomainError::TerminalState {
                task_id: self.id,
                state: self.state,
            });
        }
        Ok(())
    }

    fn ensure_matched_provider(&self, provider_id: ProviderId) -> Result<(), TaskDomainError> {
        if self.matched_provider_id != Some(provider_id) {
            return Err(TaskDomainError::NotMatchedProvider {
                task_id: self.id,
                provider_id,
            });
        }
        Ok(())
    }

    /// Guards a response to a direct request: the task must hold a pending
    /// request and the caller must be the provider it addresses.
    fn ensure_pending_request(
        &self,
        provider_id: ProviderId,
        target: TaskState,
    ) -> Result<(), TaskDomainError> {
        self.ensure_not_terminal()?;
        if self.state != TaskState::Requested {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.state,
                to: target,
            });
        }
        if self.requested_provider_id != Some(provider_id) {
            return Err(TaskDomainError::NotRequestedProvider {
                task_id: self.id,
                provider_id,
            });
        }
        Ok(())
    }

    fn set_matched(
        &mut self,
        provider_id: ProviderId,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        self.matched_provider_id = Some(provider_id);
        self.transition_to(TaskState::Matched, clock)
    }

    /// Moves the task along a validated lifecycle edge and stamps the
    /// transition timestamp.
    fn transition_to(
        &mut self,
        target: TaskState,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if !self.state.can_transition_to(target) {
            if self.state.is_terminal() {
                return Err(TaskDomainError::TerminalState {
                    task_id: self.id,
                    state: self.state,
                });
            }
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.state,
                to: target,
            });
        }

        let timestamp = clock.utc();
        match target {
            // A decline reopens the task; keep the original publication time.
            TaskState::Floating if self.published_at.is_none() => {
                self.published_at = Some(timestamp);
            }
            TaskState::Matched => self.matched_at = Some(timestamp),
            TaskState::InProgress => self.started_at = Some(timestamp),
            TaskState::Completed => self.completed_at = Some(timestamp),
            TaskState::Cancelled => self.cancelled_at = Some(timestamp),
            _ => {}
        }
        self.state = target;
        self.updated_at = timestamp;
        Ok(())
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
