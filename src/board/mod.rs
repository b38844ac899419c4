//! Board collaborator surface.
//!
//! The engine reads tile geometry through the [`Board`] trait and never
//! mutates it. Adjacency is a precomputed neighbour relation; walkability
//! and deadliness are per-tile flags consulted by the move state machine
//! and the rules core.
//!
//! [`GridBoard`] is the bundled rectangular implementation used by the
//! reference game and the test suites; rendering-oriented boards can
//! implement the trait themselves.

pub mod grid;
pub mod pathfind;

pub use grid::GridBoard;
pub use pathfind::shortest_path;

use serde::{Deserialize, Serialize};

use crate::core::TileId;

/// A single board tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    /// Units may stand on walkable tiles; moves into non-walkable tiles are
    /// blocked.
    pub walkable: bool,
    /// Entering a deadly tile kills the entering unit.
    pub deadly: bool,
}

impl Tile {
    /// Create a walkable, non-deadly tile.
    #[must_use]
    pub const fn new(id: TileId) -> Self {
        Self {
            id,
            walkable: true,
            deadly: false,
        }
    }
}

/// Read-only tile geometry.
///
/// Implementations must be shareable across threads: the rules core holds
/// the board behind an `Arc` so forks share it instead of copying it.
pub trait Board: Send + Sync {
    /// Look up a tile by identifier.
    fn tile(&self, id: TileId) -> Option<&Tile>;

    /// Adjacent tile identifiers, in a deterministic order.
    ///
    /// Adjacency ignores walkability: a walled tile is still a neighbour,
    /// so moves into it are rejected as blocked rather than non-adjacent.
    fn neighbours(&self, id: TileId) -> &[TileId];

    /// Distance in pixels between two adjacent tile centres.
    ///
    /// Used to derive the frame count of a single-tile move from unit
    /// speed; purely numeric, no rendering involved.
    fn tile_distance(&self) -> f32;

    /// Whether the tile exists and is walkable.
    fn is_walkable(&self, id: TileId) -> bool {
        self.tile(id).is_some_and(|t| t.walkable)
    }

    /// Whether the tile exists and is deadly.
    fn is_deadly(&self, id: TileId) -> bool {
        self.tile(id).is_some_and(|t| t.deadly)
    }

    /// Whether two tiles are adjacent.
    fn are_neighbours(&self, a: TileId, b: TileId) -> bool {
        self.neighbours(a).contains(&b)
    }
}
