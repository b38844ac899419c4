//! Tile occupancy tracking.
//!
//! Two maps kept in lockstep: `tile → ordered occupants` and its inverse
//! `unit → tile`. The invariant — every placed unit appears in exactly one
//! tile's occupant list, and that list contains it — must hold before and
//! after every rules-core update; [`OccupancyMap::is_consistent`] checks it
//! on demand.
//!
//! Built on `im` persistent maps so cloning the whole occupancy state for
//! a simulation fork is a structural-sharing copy, not a rebuild.

use im::{HashMap as ImHashMap, Vector};

use crate::core::{TileId, UnitId};

/// Bidirectional unit-position index.
#[derive(Clone, Debug, Default)]
pub struct OccupancyMap {
    /// unit → tile
    positions: ImHashMap<UnitId, TileId>,
    /// tile → units, in arrival order
    occupants: ImHashMap<TileId, Vector<UnitId>>,
}

impl OccupancyMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a unit on a tile.
    ///
    /// Returns `false` (and changes nothing) if the unit is already placed.
    pub fn place(&mut self, unit: UnitId, tile: TileId) -> bool {
        if self.positions.contains_key(&unit) {
            return false;
        }
        self.positions.insert(unit, tile);
        self.occupants.entry(tile).or_insert_with(Vector::new).push_back(unit);
        true
    }

    /// Move a placed unit to another tile.
    ///
    /// Returns the tile it came from, or `None` if the unit is not placed.
    pub fn move_to(&mut self, unit: UnitId, tile: TileId) -> Option<TileId> {
        let old = self.positions.get(&unit).copied()?;
        if old == tile {
            return Some(old);
        }

        if let Some(list) = self.occupants.get_mut(&old) {
            list.retain(|&u| u != unit);
        }
        self.positions.insert(unit, tile);
        self.occupants.entry(tile).or_insert_with(Vector::new).push_back(unit);
        Some(old)
    }

    /// Remove a unit from the map entirely.
    ///
    /// Returns the tile it was on, or `None` if not placed.
    pub fn remove(&mut self, unit: UnitId) -> Option<TileId> {
        let tile = self.positions.remove(&unit)?;
        if let Some(list) = self.occupants.get_mut(&tile) {
            list.retain(|&u| u != unit);
        }
        Some(tile)
    }

    /// The tile a unit stands on.
    #[must_use]
    pub fn tile_of(&self, unit: UnitId) -> Option<TileId> {
        self.positions.get(&unit).copied()
    }

    /// Whether the unit is placed anywhere.
    #[must_use]
    pub fn contains(&self, unit: UnitId) -> bool {
        self.positions.contains_key(&unit)
    }

    /// The units on a tile, in arrival order.
    pub fn occupants(&self, tile: TileId) -> impl Iterator<Item = UnitId> + '_ {
        self.occupants
            .get(&tile)
            .into_iter()
            .flat_map(|list| list.iter().copied())
    }

    /// Number of placed units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no unit is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check the two-sided consistency invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        // Every position is mirrored exactly once in its occupant list.
        for (unit, tile) in self.positions.iter() {
            let mirrored = self
                .occupants
                .get(tile)
                .map_or(0, |list| list.iter().filter(|&&u| u == *unit).count());
            if mirrored != 1 {
                return false;
            }
        }
        // Every occupant entry is backed by a position.
        for (tile, list) in self.occupants.iter() {
            for unit in list.iter() {
                if self.positions.get(unit) != Some(tile) {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_and_lookup() {
        let mut map = OccupancyMap::new();
        let tile = TileId::new(0, 0);

        assert!(map.place(UnitId::player(0), tile));
        assert!(map.place(UnitId::player(1), tile));

        assert_eq!(map.tile_of(UnitId::player(0)), Some(tile));
        assert_eq!(map.tile_of(UnitId::player(7)), None);

        let on_tile: Vec<_> = map.occupants(tile).collect();
        assert_eq!(on_tile, vec![UnitId::player(0), UnitId::player(1)]);
        assert!(map.is_consistent());
    }

    #[test]
    fn test_double_place_rejected() {
        let mut map = OccupancyMap::new();
        assert!(map.place(UnitId::player(0), TileId::new(0, 0)));
        assert!(!map.place(UnitId::player(0), TileId::new(1, 1)));
        assert_eq!(map.tile_of(UnitId::player(0)), Some(TileId::new(0, 0)));
    }

    #[test]
    fn test_move() {
        let mut map = OccupancyMap::new();
        let a = TileId::new(0, 0);
        let b = TileId::new(0, 1);

        map.place(UnitId::player(0), a);
        let old = map.move_to(UnitId::player(0), b);

        assert_eq!(old, Some(a));
        assert_eq!(map.tile_of(UnitId::player(0)), Some(b));
        assert_eq!(map.occupants(a).count(), 0);
        assert_eq!(map.occupants(b).count(), 1);
        assert!(map.is_consistent());
    }

    #[test]
    fn test_move_unplaced() {
        let mut map = OccupancyMap::new();
        assert_eq!(map.move_to(UnitId::player(3), TileId::new(0, 0)), None);
    }

    #[test]
    fn test_remove() {
        let mut map = OccupancyMap::new();
        let tile = TileId::new(2, 2);

        map.place(UnitId::player(0), tile);
        assert_eq!(map.remove(UnitId::player(0)), Some(tile));
        assert!(!map.contains(UnitId::player(0)));
        assert_eq!(map.occupants(tile).count(), 0);
        assert_eq!(map.remove(UnitId::player(0)), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_arrival_order_preserved() {
        let mut map = OccupancyMap::new();
        let tile = TileId::new(1, 1);

        map.place(UnitId(-1), tile);
        map.place(UnitId::player(0), tile);
        map.place(UnitId(-2), tile);

        let order: Vec<_> = map.occupants(tile).collect();
        assert_eq!(order, vec![UnitId(-1), UnitId::player(0), UnitId(-2)]);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut map = OccupancyMap::new();
        map.place(UnitId::player(0), TileId::new(0, 0));

        let snapshot = map.clone();
        map.move_to(UnitId::player(0), TileId::new(0, 1));

        assert_eq!(snapshot.tile_of(UnitId::player(0)), Some(TileId::new(0, 0)));
        assert_eq!(map.tile_of(UnitId::player(0)), Some(TileId::new(0, 1)));
    }
}
