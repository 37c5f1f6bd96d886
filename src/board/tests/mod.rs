//! Unit and behavioural tests for the board module.
