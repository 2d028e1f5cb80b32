//! `PostgreSQL` adapters for task lifecycle persistence.

pub(crate) mod models;
pub(crate) mod repository;
mod schema;

pub use repository::{PostgresTaskRepository, TaskPgPool};
