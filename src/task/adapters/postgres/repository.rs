//! `PostgreSQL` repository implementation for task lifecycle storage.
//!
//! The optimistic-concurrency contract maps onto conditional writes:
//! `UPDATE … WHERE id = ? AND state = ?`, checking the affected row count.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::task::{
    domain::{
        CancelledBy, CustomerId, DeclineRecord, PersistedTaskData, ProviderId, Task, TaskDetails,
        TaskId, TaskState,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task, expected_state: TaskState) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let changes = to_changeset(task)?;

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .filter(tasks::state.eq(expected_state.as_str())),
            )
            .set(&changes)
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;

            if affected == 0 {
                return Err(conditional_write_failure(
                    connection,
                    task_id,
                    expected_state,
                ));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: TaskId, expected_state: TaskState) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(
                tasks::table
                    .filter(tasks::id.eq(id.into_inner()))
                    .filter(tasks::state.eq(expected_state.as_str())),
            )
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;

            if affected == 0 {
                return Err(conditional_write_failure(connection, id, expected_state));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_customer(&self, customer_id: CustomerId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::customer_id.eq(customer_id.into_inner()))
                .order(tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn find_floating(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::state.eq(TaskState::Floating.as_str()))
                .order(tasks::published_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn find_by_matched_provider(
        &self,
        provider_id: ProviderId,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::matched_provider_id.eq(provider_id.into_inner()))
                .order(tasks::matched_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

/// Classifies a conditional write that touched zero rows: either the row is
/// gone or its state moved on since the caller read it.
fn conditional_write_failure(
    connection: &mut PgConnection,
    task_id: TaskId,
    expected: TaskState,
) -> TaskRepositoryError {
    let exists = tasks::table
        .filter(tasks::id.eq(task_id.into_inner()))
        .count()
        .get_result::<i64>(connection);
    match exists {
        Ok(0) => TaskRepositoryError::NotFound(task_id),
        Ok(_) => TaskRepositoryError::ConcurrentModification { task_id, expected },
        Err(err) => TaskRepositoryError::persistence(err),
    }
}

pub(crate) fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    let details = serde_json::to_value(task.details()).map_err(TaskRepositoryError::persistence)?;
    let interested_providers = serde_json::to_value(task.interested_providers())
        .map_err(TaskRepositoryError::persistence)?;
    let decline_history =
        serde_json::to_value(task.decline_history()).map_err(TaskRepositoryError::persistence)?;

    Ok(NewTaskRow {
        id: task.id().into_inner(),
        customer_id: task.customer_id().into_inner(),
        details,
        state: task.state().as_str().to_owned(),
        matched_provider_id: task.matched_provider_id().map(ProviderId::into_inner),
        requested_provider_id: task.requested_provider_id().map(ProviderId::into_inner),
        interested_providers,
        decline_history,
        cancelled_by: task
            .cancelled_by()
            .map(|actor| actor.as_str().to_owned()),
        cancel_reason: task.cancel_reason().map(str::to_owned),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
        published_at: task.published_at(),
        matched_at: task.matched_at(),
        started_at: task.started_at(),
        completed_at: task.completed_at(),
        cancelled_at: task.cancelled_at(),
    })
}

pub(crate) fn to_changeset(task: &Task) -> TaskRepositoryResult<TaskChangeset> {
    let details = serde_json::to_value(task.details()).map_err(TaskRepositoryError::persistence)?;
    let interested_providers = serde_json::to_value(task.interested_providers())
        .map_err(TaskRepositoryError::persistence)?;
    let decline_history =
        serde_json::to_value(task.decline_history()).map_err(TaskRepositoryError::persistence)?;

    Ok(TaskChangeset {
        details,
        state: task.state().as_str().to_owned(),
        matched_provider_id: task.matched_provider_id().map(ProviderId::into_inner),
        requested_provider_id: task.requested_provider_id().map(ProviderId::into_inner),
        interested_providers,
        decline_history,
        cancelled_by: task
            .cancelled_by()
            .map(|actor| actor.as_str().to_owned()),
        cancel_reason: task.cancel_reason().map(str::to_owned),
        updated_at: task.updated_at(),
        published_at: task.published_at(),
        matched_at: task.matched_at(),
        started_at: task.started_at(),
        completed_at: task.completed_at(),
        cancelled_at: task.cancelled_at(),
    })
}

pub(crate) fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let details = serde_json::from_value::<TaskDetails>(row.details)
        .map_err(TaskRepositoryError::persistence)?;
    let state =
        TaskState::try_from(row.state.as_str()).map_err(TaskRepositoryError::persistence)?;
    let interested_providers = serde_json::from_value::<Vec<ProviderId>>(row.interested_providers)
        .map_err(TaskRepositoryError::persistence)?;
    let decline_history = serde_json::from_value::<Vec<DeclineRecord>>(row.decline_history)
        .map_err(TaskRepositoryError::persistence)?;
    let cancelled_by = row
        .cancelled_by
        .as_deref()
        .map(CancelledBy::try_from)
        .transpose()
        .map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        customer_id: CustomerId::from_uuid(row.customer_id),
        details,
        state,
        matched_provider_id: row.matched_provider_id.map(ProviderId::from_uuid),
        requested_provider_id: row.requested_provider_id.map(ProviderId::from_uuid),
        interested_providers,
        decline_history,
        cancelled_by,
        cancel_reason: row.cancel_reason,
        created_at: row.created_at,
        updated_at: row.updated_at,
        published_at: row.published_at,
        matched_at: row.matched_at,
        started_at: row.started_at,
        completed_at: row.completed_at,
        cancelled_at: row.cancelled_at,
    };
    Ok(Task::from_persisted(data))
}
