//! Task lifecycle management for Taskmarket.
//!
//! This module implements the marketplace task engine: creating tasks in
//! draft, publishing them to the open market, mediating provider interest
//! and direct provider requests, and enforcing validated lifecycle
//! transitions through to completion or cancellation. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
