//! The rules core: units, teams, occupancy, collisions, termination.
//!
//! `GameCore` is the forkable heart of the engine. All of its collections
//! are `im` persistent structures and the board is shared behind an `Arc`,
//! so a clone is a complete, independent copy of the *game* state while
//! presentation concerns never enter it in the first place.

use std::sync::Arc;

use im::{HashMap as ImHashMap, Vector};

use crate::board::Board;
use crate::core::{TeamId, TileId, Unit, UnitId};

use super::occupancy::OccupancyMap;
use super::{CollisionPolicy, ConsistencyError, GameOutcome};

/// Rules-engine state for one game session.
#[derive(Clone)]
pub struct GameCore {
    board: Arc<dyn Board>,
    policy: CollisionPolicy,
    units: ImHashMap<UnitId, Unit>,
    /// team → members, for the unit's whole lifetime (death does not
    /// unregister).
    teams: ImHashMap<TeamId, Vector<UnitId>>,
    occupancy: OccupancyMap,
    /// Next synthetic id, counting down from -1. Forked with the state so
    /// parallel forks allocate identically.
    next_synthetic: i32,
    /// Memoized termination result; set once, never cleared.
    outcome: Option<GameOutcome>,
}

impl GameCore {
    /// Create an empty core over a board.
    #[must_use]
    pub fn new(board: Arc<dyn Board>, policy: CollisionPolicy) -> Self {
        Self {
            board,
            policy,
            units: ImHashMap::new(),
            teams: ImHashMap::new(),
            occupancy: OccupancyMap::new(),
            next_synthetic: -1,
            outcome: None,
        }
    }

    /// The board geometry.
    #[must_use]
    pub fn board(&self) -> &dyn Board {
        self.board.as_ref()
    }

    /// The collision policy in force.
    #[must_use]
    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    // === Units ===

    /// Register a unit and place it on its origin tile.
    pub fn add_unit(&mut self, unit: Unit, origin: TileId) -> Result<(), ConsistencyError> {
        if self.units.contains_key(&unit.id) {
            return Err(ConsistencyError::InconsistentState {
                reason: format!("{} added twice", unit.id),
            });
        }
        if !self.board.is_walkable(origin) {
            return Err(ConsistencyError::InconsistentState {
                reason: format!("origin tile {origin} is not walkable"),
            });
        }

        let id = unit.id;
        let team = unit.team;
        self.units.insert(id, unit);
        self.teams
            .entry(team)
            .or_insert_with(Vector::new)
            .push_back(id);
        self.occupancy.place(id, origin);
        Ok(())
    }

    /// Allocate a fresh synthetic unit id.
    pub fn alloc_synthetic_id(&mut self) -> UnitId {
        let id = UnitId(self.next_synthetic);
        self.next_synthetic -= 1;
        id
    }

    /// Spawn a synthetic, non-counted unit (a trace, a box) on a tile.
    pub fn spawn_synthetic(
        &mut self,
        team: TeamId,
        owner: UnitId,
        tile: TileId,
    ) -> Result<UnitId, ConsistencyError> {
        let id = self.alloc_synthetic_id();
        self.add_unit(Unit::synthetic(id, team, owner), tile)?;
        Ok(id)
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Whether the unit exists and is alive.
    #[must_use]
    pub fn is_alive(&self, id: UnitId) -> bool {
        self.units.get(&id).is_some_and(Unit::alive)
    }

    /// Iterate over all units, alive or dead.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// The live counted units, i.e. the players still in the game.
    #[must_use]
    pub fn live_counted_units(&self) -> Vec<UnitId> {
        let mut alive: Vec<UnitId> = self
            .units
            .values()
            .filter(|u| u.counted && u.alive())
            .map(|u| u.id)
            .collect();
        alive.sort();
        alive
    }

    /// Members of a team, including dead ones.
    pub fn team_members(&self, team: TeamId) -> impl Iterator<Item = UnitId> + '_ {
        self.teams
            .get(&team)
            .into_iter()
            .flat_map(|members| members.iter().copied())
    }

    /// The registered team ids, in ascending order.
    #[must_use]
    pub fn team_ids(&self) -> Vec<TeamId> {
        let mut ids: Vec<TeamId> = self.teams.keys().copied().collect();
        ids.sort();
        ids
    }

    // === Positions ===

    /// The tile a unit stands on, if it is placed.
    #[must_use]
    pub fn tile_of(&self, id: UnitId) -> Option<TileId> {
        self.occupancy.tile_of(id)
    }

    /// The tile a known, placed unit stands on.
    ///
    /// Unknown units and alive-but-unplaced units are consistency errors.
    pub fn position_of(&self, id: UnitId) -> Result<TileId, ConsistencyError> {
        if !self.units.contains_key(&id) {
            return Err(ConsistencyError::UnknownUnit(id));
        }
        self.occupancy
            .tile_of(id)
            .ok_or_else(|| ConsistencyError::InconsistentState {
                reason: format!("{id} is tracked but not placed on any tile"),
            })
    }

    /// Units currently on a tile, in arrival order.
    pub fn occupants(&self, tile: TileId) -> impl Iterator<Item = UnitId> + '_ {
        self.occupancy.occupants(tile)
    }

    /// The occupancy index (for invariant checks in tests and debugging).
    #[must_use]
    pub fn occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    // === State updates ===

    /// Apply a completed move step: relocate the unit, apply deadly-tile
    /// rules and resolve collisions with every other live occupant.
    ///
    /// Updates for dead units are silently ignored — post-mortem updates
    /// are expected when a unit dies while its path is still draining. An
    /// alive unit that is not tracked in occupancy is a fatal
    /// inconsistency.
    pub fn update_game_state(
        &mut self,
        unit: UnitId,
        new_tile: TileId,
    ) -> Result<(), ConsistencyError> {
        let Some(u) = self.units.get(&unit) else {
            return Err(ConsistencyError::UnknownUnit(unit));
        };
        if !u.alive() {
            return Ok(());
        }
        if self.board.tile(new_tile).is_none() {
            return Err(ConsistencyError::InconsistentState {
                reason: format!("{unit} moved to a tile off the board: {new_tile}"),
            });
        }
        if self.occupancy.move_to(unit, new_tile).is_none() {
            return Err(ConsistencyError::InconsistentState {
                reason: format!("{unit} is alive but absent from the occupancy map"),
            });
        }

        if self.board.is_deadly(new_tile) {
            self.kill_unit(unit);
            return Ok(());
        }

        let others: Vec<UnitId> = self
            .occupancy
            .occupants(new_tile)
            .filter(|&o| o != unit && self.is_alive(o))
            .collect();
        for victim in others {
            self.collide(unit, victim);
            if !self.is_alive(unit) {
                break;
            }
        }
        Ok(())
    }

    /// Resolve one collision: `instigator` just arrived on `victim`'s tile.
    ///
    /// The instigator dies unless policy exempts the collision; the victim
    /// dies too only for frontal collisions (the victim is itself a
    /// counted, moving unit rather than a static trace or box).
    fn collide(&mut self, instigator: UnitId, victim: UnitId) {
        let Some(inst) = self.units.get(&instigator) else {
            return;
        };
        let Some(vict) = self.units.get(&victim) else {
            return;
        };

        let own_entity = victim == instigator || vict.owner == Some(instigator);
        if own_entity {
            if self.policy.suicide_allowed {
                self.kill_unit(instigator);
            }
            return;
        }

        if inst.team == vict.team && !self.policy.team_kill_allowed {
            return;
        }

        let frontal = vict.counted;
        self.kill_unit(instigator);
        if frontal {
            self.kill_unit(victim);
        }
    }

    /// Take one life from a unit; a unit that dies is removed from
    /// occupancy. Returns `true` if the unit is dead afterwards.
    pub fn kill_unit(&mut self, id: UnitId) -> bool {
        let Some(unit) = self.units.get_mut(&id) else {
            return false;
        };
        unit.kill();
        if unit.alive() {
            return false;
        }
        self.occupancy.remove(id);
        true
    }

    /// Give a unit a life back and re-place it on a tile.
    pub fn revive_unit(&mut self, id: UnitId, tile: TileId) -> Result<(), ConsistencyError> {
        if !self.board.is_walkable(tile) {
            return Err(ConsistencyError::InconsistentState {
                reason: format!("cannot revive {id} on non-walkable tile {tile}"),
            });
        }
        let Some(unit) = self.units.get_mut(&id) else {
            return Err(ConsistencyError::UnknownUnit(id));
        };
        unit.revive();
        if !self.occupancy.contains(id) {
            self.occupancy.place(id, tile);
        }
        Ok(())
    }

    // === Termination ===

    /// Check whether the game is finished.
    ///
    /// The game finishes the first time fewer than two teams still have a
    /// live counted unit; the result is memoized, so once finished the
    /// same outcome is reported forever (termination is monotonic).
    pub fn check_if_finished(&mut self) -> Option<&GameOutcome> {
        if self.outcome.is_some() {
            return self.outcome.as_ref();
        }

        let mut surviving: Vec<TeamId> = Vec::new();
        for (&team, members) in self.teams.iter() {
            let has_live = members
                .iter()
                .any(|id| self.units.get(id).is_some_and(|u| u.counted && u.alive()));
            if has_live {
                surviving.push(team);
            }
        }

        if surviving.len() >= 2 {
            return None;
        }

        let outcome = match surviving.first() {
            None => GameOutcome::Tie,
            Some(&team) => {
                let mut units: Vec<UnitId> = self
                    .team_members(team)
                    .filter(|&id| self.units.get(&id).is_some_and(|u| u.counted && u.alive()))
                    .collect();
                units.sort();
                GameOutcome::Win { team, units }
            }
        };
        self.outcome = Some(outcome);
        self.outcome.as_ref()
    }

    /// The memoized outcome, if the game already finished.
    #[must_use]
    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }
}
