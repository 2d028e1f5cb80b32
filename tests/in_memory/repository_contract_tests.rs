//! Optimistic-concurrency contract of the in-memory repository.

use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use taskmarket::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{CancelActor, CustomerId, ProviderId, Schedule, Task, TaskDetails, TaskId, TaskState},
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{Duration, Utc};

#[fixture]
fn repo() -> InMemoryTaskRepository {
    InMemoryTaskRepository::new()
}

fn draft_task(customer_id: CustomerId) -> eyre::Result<Task> {
    let starts_at = Utc::now() + Duration::days(1);
    let schedule = Schedule::new(starts_at, starts_at + Duration::hours(2))?;
    let details = TaskDetails::new("Fix sink", "Accra", schedule)?;
    Ok(Task::new(customer_id, details, &DefaultClock))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn storing_the_same_task_twice_is_rejected(repo: InMemoryTaskRepository) -> eyre::Result<()> {
    let task = draft_task(CustomerId::new())?;
    repo.store(&task).await?;

    let result = repo.store(&task).await;

    ensure!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn updating_an_unknown_task_reports_not_found(
    repo: InMemoryTaskRepository,
) -> eyre::Result<()> {
    let task = draft_task(CustomerId::new())?;

    let result = repo.update(&task, TaskState::Draft).await;

    ensure!(matches!(
        result,
        Err(TaskRepositoryError::NotFound(id)) if id == task.id()
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_an_unknown_task_reports_not_found(
    repo: InMemoryTaskRepository,
) -> eyre::Result<()> {
    let missing = TaskId::new();

    let result = repo.delete(missing, TaskState::Draft).await;

    ensure!(matches!(
        result,
        Err(TaskRepositoryError::NotFound(id)) if id == missing
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_update_is_rejected_as_concurrent_modification(
    repo: InMemoryTaskRepository,
) -> eyre::Result<()> {
    let clock = DefaultClock;
    let customer_id = CustomerId::new();
    let task = draft_task(customer_id)?;
    repo.store(&task).await?;

    let mut winner = task.clone();
    let mut loser = task.clone();
    winner.publish(customer_id, &clock)?;
    loser.cancel(CancelActor::Customer(customer_id), "changed plans", &clock)?;

    repo.update(&winner, TaskState::Draft).await?;
    let result = repo.update(&loser, TaskState::Draft).await;

    ensure!(matches!(
        result,
        Err(TaskRepositoryError::ConcurrentModification {
            expected: TaskState::Draft,
            ..
        })
    ));
    // The winning write is untouched.
    let stored = repo
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task should still exist"))?;
    ensure!(stored.state() == TaskState::Floating);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_delete_is_rejected_as_concurrent_modification(
    repo: InMemoryTaskRepository,
) -> eyre::Result<()> {
    let clock = DefaultClock;
    let customer_id = CustomerId::new();
    let mut task = draft_task(customer_id)?;
    repo.store(&task).await?;

    task.publish(customer_id, &clock)?;
    repo.update(&task, TaskState::Draft).await?;

    // A deleter still holding the draft snapshot must not remove the
    // published task.
    let result = repo.delete(task.id(), TaskState::Draft).await;

    ensure!(matches!(
        result,
        Err(TaskRepositoryError::ConcurrentModification { .. })
    ));
    ensure!(repo.find_by_id(task.id()).await?.is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_one_of_two_racing_acceptances_wins(
    repo: InMemoryTaskRepository,
) -> eyre::Result<()> {
    let clock = DefaultClock;
    let customer_id = CustomerId::new();
    let provider_id = ProviderId::new();
    let mut task = draft_task(customer_id)?;
    task.publish(customer_id, &clock)?;
    task.request_provider(customer_id, provider_id, &clock)?;
    repo.store(&task).await?;

    // Two handlers loaded the requested task and both apply the acceptance.
    let mut first = task.clone();
    let mut second = task.clone();
    first.accept_request(provider_id, &clock)?;
    second.accept_request(provider_id, &clock)?;

    repo.update(&first, TaskState::Requested).await?;
    let result = repo.update(&second, TaskState::Requested).await;

    ensure!(matches!(
        result,
        Err(TaskRepositoryError::ConcurrentModification {
            expected: TaskState::Requested,
            ..
        })
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn queries_filter_by_state_and_ownership(repo: InMemoryTaskRepository) -> eyre::Result<()> {
    let clock = DefaultClock;
    let customer_a = CustomerId::new();
    let customer_b = CustomerId::new();

    let draft = draft_task(customer_a)?;
    repo.store(&draft).await?;

    let mut floating = draft_task(customer_b)?;
    floating.publish(customer_b, &clock)?;
    repo.store(&floating).await?;

    let open = repo.find_floating().await?;
    ensure!(open.len() == 1);
    ensure!(open.first().map(Task::id) == Some(floating.id()));

    let for_a = repo.find_by_customer(customer_a).await?;
    ensure!(for_a.len() == 1);
    ensure!(for_a.first().map(Task::id) == Some(draft.id()));
    Ok(())
}
