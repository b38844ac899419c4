//! Shortest-path helper over a board.
//!
//! A* with a Manhattan heuristic, used by move-descriptor generators
//! (click-to-walk style moves) to build multi-step paths. The walkability
//! predicate is a parameter so callers can treat occupied tiles as blocked
//! without touching board geometry.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use crate::core::TileId;

use super::Board;

/// Find a shortest walkable path from `from` to `to`.
///
/// Returns the tile sequence excluding `from` and including `to`, or `None`
/// when no path exists. `from == to` yields an empty path.
///
/// The `walkable` predicate is consulted for every tile except `from`;
/// tiles the board itself marks non-walkable are always excluded.
///
/// ```
/// use grid_arena::board::{shortest_path, Board, GridBoard};
/// use grid_arena::core::TileId;
///
/// let board = GridBoard::new(4, 4);
/// let path = shortest_path(&board, TileId::new(0, 0), TileId::new(0, 3), |_| true).unwrap();
/// assert_eq!(path, vec![TileId::new(0, 1), TileId::new(0, 2), TileId::new(0, 3)]);
/// ```
pub fn shortest_path(
    board: &dyn Board,
    from: TileId,
    to: TileId,
    walkable: impl Fn(TileId) -> bool,
) -> Option<Vec<TileId>> {
    if from == to {
        return Some(Vec::new());
    }
    if !board.is_walkable(to) || !walkable(to) {
        return None;
    }

    // (f-score, insertion counter) keys keep the heap deterministic.
    let mut open: BinaryHeap<Reverse<(u32, u64, TileId)>> = BinaryHeap::new();
    let mut g_score: FxHashMap<TileId, u32> = FxHashMap::default();
    let mut came_from: FxHashMap<TileId, TileId> = FxHashMap::default();
    let mut counter = 0u64;

    g_score.insert(from, 0);
    open.push(Reverse((from.manhattan(to), counter, from)));

    while let Some(Reverse((_, _, current))) = open.pop() {
        if current == to {
            let mut path = Vec::new();
            let mut tile = to;
            while tile != from {
                path.push(tile);
                tile = came_from[&tile];
            }
            path.reverse();
            return Some(path);
        }

        let current_g = g_score[&current];
        for &next in board.neighbours(current) {
            if !board.is_walkable(next) || !walkable(next) {
                continue;
            }
            let tentative = current_g + 1;
            if g_score.get(&next).map_or(true, |&g| tentative < g) {
                g_score.insert(next, tentative);
                came_from.insert(next, current);
                counter += 1;
                open.push(Reverse((tentative + next.manhattan(to), counter, next)));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GridBoard;

    #[test]
    fn test_straight_line() {
        let board = GridBoard::new(4, 4);
        let path =
            shortest_path(&board, TileId::new(0, 0), TileId::new(0, 3), |_| true).unwrap();

        assert_eq!(
            path,
            vec![TileId::new(0, 1), TileId::new(0, 2), TileId::new(0, 3)]
        );
    }

    #[test]
    fn test_detour_around_wall() {
        let board = GridBoard::new(4, 4).with_wall(TileId::new(0, 2));
        let path =
            shortest_path(&board, TileId::new(0, 0), TileId::new(0, 3), |_| true).unwrap();

        // The wall forces a length-5 detour through row 1.
        assert_eq!(path.len(), 5);
        assert_eq!(*path.last().unwrap(), TileId::new(0, 3));
        assert!(!path.contains(&TileId::new(0, 2)));

        // Every hop is between adjacent walkable tiles.
        let mut prev = TileId::new(0, 0);
        for &tile in &path {
            assert!(board.are_neighbours(prev, tile));
            assert!(board.is_walkable(tile));
            prev = tile;
        }
    }

    #[test]
    fn test_same_source_and_destination() {
        let board = GridBoard::new(2, 2);
        let path =
            shortest_path(&board, TileId::new(1, 1), TileId::new(1, 1), |_| true).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_unreachable() {
        // Wall off the destination column entirely.
        let board = GridBoard::new(2, 3)
            .with_wall(TileId::new(0, 1))
            .with_wall(TileId::new(1, 1));

        let path = shortest_path(&board, TileId::new(0, 0), TileId::new(0, 2), |_| true);
        assert!(path.is_none());
    }

    #[test]
    fn test_predicate_blocks_tiles() {
        let board = GridBoard::new(4, 4);
        let blocked = TileId::new(0, 2);

        let path =
            shortest_path(&board, TileId::new(0, 0), TileId::new(0, 3), |t| t != blocked)
                .unwrap();
        assert_eq!(path.len(), 5);
        assert!(!path.contains(&blocked));
    }

    #[test]
    fn test_blocked_destination() {
        let board = GridBoard::new(2, 2).with_wall(TileId::new(1, 1));
        assert!(shortest_path(&board, TileId::new(0, 0), TileId::new(1, 1), |_| true).is_none());
    }
}
