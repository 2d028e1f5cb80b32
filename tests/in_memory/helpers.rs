//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use chrono::{Duration, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use taskmarket::task::{
    adapters::memory::{InMemoryTaskRepository, RecordingTaskEventPublisher},
    domain::{CustomerId, Task},
    services::{CreateTaskRequest, MatchingService, TaskLifecycleService},
};

/// Wires the lifecycle and matching services to shared in-memory
/// adapters, keeping direct handles for assertions.
pub struct Market {
    pub lifecycle:
        TaskLifecycleService<InMemoryTaskRepository, RecordingTaskEventPublisher, DefaultClock>,
    pub matching:
        MatchingService<InMemoryTaskRepository, RecordingTaskEventPublisher, DefaultClock>,
    pub publisher: RecordingTaskEventPublisher,
}

/// Provides a fresh market wiring for each test.
#[fixture]
pub fn market() -> Market {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let publisher = RecordingTaskEventPublisher::new();
    let events = Arc::new(publisher.clone());
    let clock = Arc::new(DefaultClock);
    Market {
        lifecycle: TaskLifecycleService::new(
            Arc::clone(&repository),
            Arc::clone(&events),
            Arc::clone(&clock),
        ),
        matching: MatchingService::new(repository, events, clock),
        publisher,
    }
}

/// Builds a plumbing request scheduled for tomorrow.
pub fn fix_sink_request(customer_id: CustomerId) -> CreateTaskRequest {
    let starts_at = Utc::now() + Duration::days(1);
    CreateTaskRequest::new(
        customer_id,
        "Fix sink",
        "Accra",
        starts_at,
        starts_at + Duration::hours(2),
    )
    .with_description("Kitchen sink is leaking")
}

/// Creates and publishes a task owned by the given customer.
///
/// # Errors
///
/// Returns an error when creation or publication fails.
pub async fn published_fix_sink(
    market: &Market,
    customer_id: CustomerId,
) -> Result<Task, eyre::Report> {
    let created = market.lifecycle.create_task(fix_sink_request(customer_id)).await?;
    let published = market.lifecycle.publish_task(created.id(), customer_id).await?;
    Ok(published)
}
