//! Domain model for marketplace task lifecycle management.
//!
//! The task domain models task creation, provider matching, and state
//! transitions while keeping all infrastructure concerns outside of the
//! domain boundary.

mod details;
mod error;
mod event;
mod ids;
mod task;

pub use details::{Schedule, TaskDetails, TaskPatch};
pub use error::{ParseCancelledByError, ParseTaskStateError, TaskDomainError};
pub use event::TaskEvent;
pub use ids::{CustomerId, ProviderId, TaskId};
pub use task::{
    CancelActor, CancelledBy, DeclineRecord, MatchOutcome, PersistedTaskData, Task, TaskState,
};
