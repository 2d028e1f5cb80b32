//! Application services for task lifecycle orchestration.

mod lifecycle;
mod matching;

pub use lifecycle::{
    CreateTaskRequest, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
};
pub use matching::{MatchingError, MatchingResult, MatchingService};

use crate::task::{domain::TaskEvent, ports::TaskEventPublisher};

/// Publishes a committed event, logging failures instead of surfacing them.
///
/// The primary state transition has already been persisted by the time an
/// event is emitted; a failed publish must never undo it.
async fn emit_best_effort<P: TaskEventPublisher>(publisher: &P, event: TaskEvent) {
    if let Err(err) = publisher.publish(&event).await {
        tracing::warn!(
            event = event.kind(),
            task_id = %event.task_id(),
            error = %err,
            "task event publish failed",
        );
    }
}
