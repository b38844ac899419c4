//! Bundled reference games.
//!
//! Complete [`GameRules`](crate::rules::GameRules) implementations used by
//! the integration tests and as worked examples for writing new games.

pub mod arena;

pub use arena::{ArenaRules, Direction};
