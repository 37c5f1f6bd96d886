//! Task board state engine.
//!
//! This module owns the rules governing task creation and ordering, stage
//! transitions between workflow columns, and the per-mutation change events
//! handed to the notification fan-out. The module follows hexagonal
//! architecture:
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
