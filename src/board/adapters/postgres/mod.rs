//! `PostgreSQL` adapter implementations of the board ports.

pub mod models;
pub mod repository;
pub mod schema;

pub use repository::{BoardPgPool, PostgresBoardRepository};
