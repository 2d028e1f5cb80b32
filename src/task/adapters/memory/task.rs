//! In-memory repository enforcing the optimistic-concurrency contract.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{CustomerId, ProviderId, Task, TaskId, TaskState},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// `update` and `delete` honour the compare-and-swap contract: the write is
/// rejected when the stored state no longer equals the expected prior
/// state, exactly as a conditional database update would behave.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut tasks = self.state.write().map_err(lock_error)?;
        if tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task, expected_state: TaskState) -> TaskRepositoryResult<()> {
        let mut tasks = self.state.write().map_err(lock_error)?;
        let stored = tasks
            .get(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        if stored.state() != expected_state {
            return Err(TaskRepositoryError::ConcurrentModification {
                task_id: task.id(),
                expected: expected_state,
            });
        }
        tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn delete(&self, id: TaskId, expected_state: TaskState) -> TaskRepositoryResult<()> {
        let mut tasks = self.state.write().map_err(lock_error)?;
        let stored = tasks.get(&id).ok_or(TaskRepositoryError::NotFound(id))?;
        if stored.state() != expected_state {
            return Err(TaskRepositoryError::ConcurrentModification {
                task_id: id,
                expected: expected_state,
            });
        }
        tasks.remove(&id);
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let tasks = self.state.read().map_err(lock_error)?;
        Ok(tasks.get(&id).cloned())
    }

    async fn find_by_customer(&self, customer_id: CustomerId) -> TaskRepositoryResult<Vec<Task>> {
        let tasks = self.state.read().map_err(lock_error)?;
        Ok(tasks
            .values()
            .filter(|task| task.customer_id() == customer_id)
            .cloned()
            .collect())
    }

    async fn find_floating(&self) -> TaskRepositoryResult<Vec<Task>> {
        let tasks = self.state.read().map_err(lock_error)?;
        Ok(tasks
            .values()
            .filter(|task| task.state() == TaskState::Floating)
            .cloned()
            .collect())
    }

    async fn find_by_matched_provider(
        &self,
        provider_id: ProviderId,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let tasks = self.state.read().map_err(lock_error)?;
        Ok(tasks
            .values()
            .filter(|task| task.matched_provider_id() == Some(provider_id))
            .cloned()
            .collect())
    }
}
