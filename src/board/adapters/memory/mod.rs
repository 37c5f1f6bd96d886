//! In-memory adapter implementations of the board ports.

mod board;

pub use board::InMemoryBoardRepository;
