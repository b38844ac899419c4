//! Rectangular grid board.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::TileId;

use super::{Board, Tile};

/// Four-way adjacency never exceeds four entries.
type Neighbours = SmallVec<[TileId; 4]>;

/// A rectangular grid with four-way adjacency.
///
/// Tiles default to walkable and harmless; individual tiles can be turned
/// into walls or deadly tiles at construction time.
///
/// ```
/// use grid_arena::board::{Board, GridBoard};
/// use grid_arena::core::TileId;
///
/// let board = GridBoard::new(4, 4).with_wall(TileId::new(0, 2));
///
/// assert!(board.is_walkable(TileId::new(0, 1)));
/// assert!(!board.is_walkable(TileId::new(0, 2)));
/// // Walls stay adjacent; they are blocked, not absent.
/// assert!(board.are_neighbours(TileId::new(0, 1), TileId::new(0, 2)));
/// ```
#[derive(Clone, Debug)]
pub struct GridBoard {
    rows: i16,
    cols: i16,
    tile_distance: f32,
    tiles: FxHashMap<TileId, Tile>,
    neighbours: FxHashMap<TileId, Neighbours>,
}

impl GridBoard {
    /// Default pixel spacing between adjacent tile centres.
    pub const DEFAULT_TILE_DISTANCE: f32 = 30.0;

    /// Create a `rows` x `cols` board of walkable tiles.
    #[must_use]
    pub fn new(rows: i16, cols: i16) -> Self {
        assert!(rows > 0 && cols > 0, "board must have at least one tile");

        let mut tiles = FxHashMap::default();
        let mut neighbours = FxHashMap::default();

        for row in 0..rows {
            for col in 0..cols {
                let id = TileId::new(row, col);
                tiles.insert(id, Tile::new(id));

                let candidates = [
                    TileId::new(row, col + 1),
                    TileId::new(row + 1, col),
                    TileId::new(row, col - 1),
                    TileId::new(row - 1, col),
                ];
                let adjacent: Neighbours = candidates
                    .into_iter()
                    .filter(|t| t.row >= 0 && t.row < rows && t.col >= 0 && t.col < cols)
                    .collect();
                neighbours.insert(id, adjacent);
            }
        }

        Self {
            rows,
            cols,
            tile_distance: Self::DEFAULT_TILE_DISTANCE,
            tiles,
            neighbours,
        }
    }

    /// Mark a tile as non-walkable.
    #[must_use]
    pub fn with_wall(mut self, id: TileId) -> Self {
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.walkable = false;
        }
        self
    }

    /// Mark a tile as deadly.
    #[must_use]
    pub fn with_deadly(mut self, id: TileId) -> Self {
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.deadly = true;
        }
        self
    }

    /// Set the pixel spacing between adjacent tile centres.
    #[must_use]
    pub fn with_tile_distance(mut self, distance: f32) -> Self {
        assert!(distance > 0.0, "tile distance must be positive");
        self.tile_distance = distance;
        self
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> i16 {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> i16 {
        self.cols
    }
}

impl Board for GridBoard {
    fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    fn neighbours(&self, id: TileId) -> &[TileId] {
        self.neighbours.get(&id).map_or(&[], |v| v.as_slice())
    }

    fn tile_distance(&self) -> f32 {
        self.tile_distance
    }
}
