//! Matching flows combining provider interest and direct requests.

use eyre::ensure;
use rstest::rstest;
use taskmarket::task::{
    domain::{CustomerId, MatchOutcome, ProviderId, TaskEvent, TaskId, TaskState},
    services::MatchingError,
};

use super::helpers::{market, published_fix_sink, Market};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn requesting_one_of_two_interested_providers_matches_them(
    market: Market,
) -> eyre::Result<()> {
    let customer_id = CustomerId::new();
    let first = ProviderId::new();
    let second = ProviderId::new();

    let task = published_fix_sink(&market, customer_id).await?;
    market.matching.express_interest(task.id(), first).await?;
    market.matching.express_interest(task.id(), second).await?;

    let (matched, outcome) = market
        .matching
        .request_provider(task.id(), customer_id, second)
        .await?;

    ensure!(outcome == MatchOutcome::Matched);
    ensure!(matched.state() == TaskState::Matched);
    ensure!(matched.matched_provider_id() == Some(second));
    // Interest is a historical record; both entries survive the match.
    ensure!(matched.interested_providers() == [first, second]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn direct_request_to_a_stranger_matches_on_acceptance(market: Market) -> eyre::Result<()> {
    let customer_id = CustomerId::new();
    let provider_id = ProviderId::new();

    let task = published_fix_sink(&market, customer_id).await?;
    let (requested, outcome) = market
        .matching
        .request_provider(task.id(), customer_id, provider_id)
        .await?;
    ensure!(outcome == MatchOutcome::Requested);
    ensure!(requested.state() == TaskState::Requested);

    let matched = market.matching.accept_request(task.id(), provider_id).await?;
    ensure!(matched.state() == TaskState::Matched);
    ensure!(matched.matched_provider_id() == Some(provider_id));
    ensure!(matched.requested_provider_id().is_none());

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
                "task_provider_requested",
                "task_matched",
            ]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn declined_request_reopens_the_task_to_the_market(market: Market) -> eyre::Result<()> {
    let customer_id = CustomerId::new();
    let declined = ProviderId::new();
    let newcomer = ProviderId::new();

    let task = published_fix_sink(&market, customer_id).await?;
    market
        .matching
        .request_provider(task.id(), customer_id, declined)
        .await?;
    let reopened = market
        .matching
        .decline_request(task.id(), declined, "fully booked this week")
        .await?;

    ensure!(reopened.state() == TaskState::Floating);
    ensure!(market.lifecycle.floating_tasks().await?.len() == 1);
    let history = reopened.decline_history();
    ensure!(history.len() == 1);
    ensure!(history.first().map(|record| record.provider_id) == Some(declined));

    // The reopened task matches through the ordinary interest flow.
    market.matching.express_interest(task.id(), newcomer).await?;
    let (matched, outcome) = market
        .matching
        .request_provider(task.id(), customer_id, newcomer)
        .await?;
    ensure!(outcome == MatchOutcome::Matched);
    ensure!(matched.matched_provider_id() == Some(newcomer));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn matching_operations_on_unknown_tasks_report_not_found(
    market: Market,
) -> eyre::Result<()> {
    let missing = TaskId::new();
    let result = market
        .matching
        .express_interest(missing, ProviderId::new())
        .await;
    ensure!(matches!(result, Err(MatchingError::NotFound(id)) if id == missing));
    Ok(())
}
