//! Tile identification.
//!
//! A `TileId` is the opaque coordinate used as a map key throughout the
//! engine. It has value semantics: two ids with the same row and column are
//! the same tile, and cloning an id never aliases board state.

use serde::{Deserialize, Serialize};

/// Identifier of a board tile (row, column).
///
/// The engine never interprets the coordinates beyond equality and hashing;
/// adjacency is the board's business.
///
/// ```
/// use grid_arena::core::TileId;
///
/// let a = TileId::new(0, 1);
/// let b = TileId::new(0, 1);
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId {
    pub row: i16,
    pub col: i16,
}

impl TileId {
    /// Create a tile identifier.
    #[must_use]
    pub const fn new(row: i16, col: i16) -> Self {
        Self { row, col }
    }

    /// Manhattan distance to another tile, in tiles.
    #[must_use]
    pub fn manhattan(self, other: TileId) -> u32 {
        self.row.abs_diff(other.row) as u32 + self.col.abs_diff(other.col) as u32
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
