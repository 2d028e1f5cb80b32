//! Unit and service tests for the task lifecycle engine.
