//! Taskmarket: task lifecycle engine for a services marketplace.
//!
//! This crate provides the core functionality for managing marketplace
//! tasks: customers post tasks, providers express interest or receive
//! direct requests, and exactly one provider is matched to carry each
//! task through to completion.
//!
//! # Architecture
//!
//! Taskmarket follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, test doubles)
//!
//! # Modules
//!
//! - [`task`]: Task creation, matching, and lifecycle state transitions

pub mod task;
