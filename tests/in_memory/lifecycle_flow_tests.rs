//! End-to-end lifecycle flows through the service layer.

use eyre::ensure;
use rstest::rstest;
use taskmarket::task::domain::{
    CancelActor, CancelledBy, CustomerId, ProviderId, Task, TaskEvent, TaskPatch, TaskState,
};

use super::helpers::{fix_sink_request, market, published_fix_sink, Market};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_journey_from_draft_to_completed(market: Market) -> eyre::Result<()> {
    let customer_id = CustomerId::new();
    let provider_id = ProviderId::new();

    let task = published_fix_sink(&market, customer_id).await?;
    market.matching.express_interest(task.id(), provider_id).await?;
    market
        .matching
        .request_provider(task.id(), customer_id, provider_id)
        .await?;
    market.lifecycle.start_task(task.id(), provider_id).await?;
    let completed = market.lifecycle.complete_task(task.id(), provider_id).await?;

    ensure!(completed.state() == TaskState::Completed);
    ensure!(completed.matched_provider_id() == Some(provider_id));
    ensure!(completed.published_at() <= completed.matched_at());
    ensure!(completed.matched_at() <= completed.started_at());
    ensure!(completed.started_at() <= completed.completed_at());

    let kinds: Vec<&'static str> = market
        .publisher
        .recorded()?
        .iter()
        .map(TaskEvent::kind)
        .collect();
    ensure!(
        kinds
            == vec![
                "task_created",
                "task_published",
                "task_interest_expressed",
                "task_matched",
                "task_started",
                "task_completed",
            ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn queries_track_the_task_through_its_lifecycle(market: Market) -> eyre::Result<()> {
    let customer_id = CustomerId::new();
    let provider_id = ProviderId::new();

    let task = published_fix_sink(&market, customer_id).await?;
    let floating = market.lifecycle.floating_tasks().await?;
    ensure!(floating.len() == 1);

    market.matching.express_interest(task.id(), provider_id).await?;
    market
        .matching
        .request_provider(task.id(), customer_id, provider_id)
        .await?;

    ensure!(market.lifecycle.floating_tasks().await?.is_empty());
    let mine = market.lifecycle.tasks_for_customer(customer_id).await?;
    ensure!(mine.len() == 1);
    let assigned = market
        .lifecycle
        .tasks_for_matched_provider(provider_id)
        .await?;
    ensure!(assigned.len() == 1);
    ensure!(assigned.first().map(Task::id) == Some(task.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn provider_cancellation_mid_progress_is_recorded(market: Market) -> eyre::Result<()> {
    let customer_id = CustomerId::new();
    let provider_id = ProviderId::new();

    let task = published_fix_sink(&market, customer_id).await?;
    market.matching.express_interest(task.id(), provider_id).await?;
    market
        .matching
        .request_provider(task.id(), customer_id, provider_id)
        .await?;
    market.lifecycle.start_task(task.id(), provider_id).await?;

    let cancelled = market
        .lifecycle
        .cancel_task(
            task.id(),
            CancelActor::Provider(provider_id),
            "equipment failure",
        )
        .await?;

    ensure!(cancelled.state() == TaskState::Cancelled);
    ensure!(cancelled.cancelled_by() == Some(CancelledBy::Provider));
    ensure!(cancelled.cancel_reason() == Some("equipment failure"));
    ensure!(cancelled.cancelled_at().is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_draft_removes_it_and_reports_the_event(market: Market) -> eyre::Result<()> {
    let customer_id = CustomerId::new();
    let created = market
        .lifecycle
        .create_task(fix_sink_request(customer_id))
        .await?;

    market.lifecycle.delete_task(created.id(), customer_id).await?;

    ensure!(market.lifecycle.find_task(created.id()).await?.is_none());
    let kinds: Vec<&'static str> = market
        .publisher
        .recorded()?
        .iter()
        .map(TaskEvent::kind)
        .collect();
    ensure!(kinds == vec!["task_created", "task_deleted"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn floating_task_edits_are_persisted(market: Market) -> eyre::Result<()> {
    let customer_id = CustomerId::new();
    let task = published_fix_sink(&market, customer_id).await?;

    market
        .lifecycle
        .update_task(
            task.id(),
            customer_id,
            TaskPatch::new()
                .with_title("Fix kitchen sink")
                .with_location("Kumasi"),
        )
        .await?;

    let stored = market
        .lifecycle
        .find_task(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task should still exist"))?;
    ensure!(stored.details().title() == "Fix kitchen sink");
    ensure!(stored.details().location() == "Kumasi");
    ensure!(stored.state() == TaskState::Floating);
    Ok(())
}
