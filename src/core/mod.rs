//! Core engine types: tiles, units, teams, RNG.
//!
//! These are the game-agnostic building blocks; everything game-specific
//! plugs in through the `rules` module.

pub mod rng;
pub mod tile;
pub mod unit;

pub use rng::GameRng;
pub use tile::TileId;
pub use unit::{TeamId, Unit, UnitId};
