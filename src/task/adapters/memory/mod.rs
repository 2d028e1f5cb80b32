//! In-memory adapters for task lifecycle tests.

mod events;
mod task;

pub use events::RecordingTaskEventPublisher;
pub use task::InMemoryTaskRepository;
