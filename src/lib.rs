//! Corkboard: collaborative task board state engine.
//!
//! This crate provides the core of a kanban-style project tool: project and
//! task records, race-free ordering allocation for new tasks, workflow stage
//! transitions, and real-time change-notification fan-out to connected
//! viewers.
//!
//! # Architecture
//!
//! Corkboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`board`]: Project/task aggregates, ordering, stage moves, and services
//! - [`notification`]: Broadcast fan-out of change events to observers

pub mod board;
pub mod notification;
