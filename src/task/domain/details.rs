//! Descriptive task fields and the typed patch applied to them.

use super::TaskDomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scheduled window during which the task should be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

impl Schedule {
    /// Creates a validated schedule window.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidSchedule`] when the window does not
    /// end strictly after it starts.
    pub fn new(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<Self, TaskDomainError> {
        if ends_at <= starts_at {
            return Err(TaskDomainError::InvalidSchedule { starts_at, ends_at });
        }
        Ok(Self { starts_at, ends_at })
    }

    /// Returns the start of the window.
    #[must_use]
    pub const fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    /// Returns the end of the window.
    #[must_use]
    pub const fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }
}

/// Descriptive fields of a task, validated at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetails {
    title: String,
    description: Option<String>,
    location: String,
    schedule: Schedule,
}

impl TaskDetails {
    /// Creates validated task details.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] or
    /// [`TaskDomainError::EmptyLocation`] when the respective field is empty
    /// after trimming.
    pub fn new(
        title: impl Into<String>,
        location: impl Into<String>,
        schedule: Schedule,
    ) -> Result<Self, TaskDomainError> {
        Ok(Self {
            title: validated_title(title.into())?,
            description: None,
            location: validated_location(location.into())?,
            schedule,
        })
    }

    /// Sets the free-form description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the task location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the scheduled window.
    #[must_use]
    pub const fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Applies a validated patch to the descriptive fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyPatch`] when the patch carries no
    /// changes, or a validation error when a patched field is invalid.
    pub(super) fn apply(&mut self, patch: TaskPatch) -> Result<(), TaskDomainError> {
        if patch.is_empty() {
            return Err(TaskDomainError::EmptyPatch);
        }
        if let Some(title) = patch.title {
            self.title = validated_title(title)?;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(location) = patch.location {
            self.location = validated_location(location)?;
        }
        if let Some(schedule) = patch.schedule {
            self.schedule = schedule;
        }
        Ok(())
    }
}

fn validated_title(title: String) -> Result<String, TaskDomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}

fn validated_location(location: String) -> Result<String, TaskDomainError> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyLocation);
    }
    Ok(trimmed.to_owned())
}

/// Explicit patch enumerating exactly the editable descriptive fields.
///
/// Fields left as `None` are untouched. Unknown fields cannot be expressed,
/// so callers cannot smuggle state or ownership changes through an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    schedule: Option<Schedule>,
}

impl TaskPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the task title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the task location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Replaces the scheduled window.
    #[must_use]
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    /// Returns `true` when the patch carries no changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.schedule.is_none()
    }
}
