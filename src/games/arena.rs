//! Tron-like direction game.

use serde::{Deserialize, Serialize};

use crate::core::{TileId, UnitId};
use crate::path::{BoxedPath, ListPath, PathHooks, ShortMove};
use crate::rules::{CollisionPolicy, GameCore, GameRules, MoveRejected};

/// One of the four cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions, in encoding order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Row/column offset of one step in this direction.
    #[must_use]
    pub fn offset(self) -> (i16, i16) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    /// The tile one step away in this direction.
    #[must_use]
    pub fn apply(self, tile: TileId) -> TileId {
        let (dr, dc) = self.offset();
        TileId::new(tile.row + dr, tile.col + dc)
    }

    /// The 180-degree reverse.
    #[must_use]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }
}

/// Rules of the arena game: four-way movement, lethal collisions and
/// optional trace laying.
///
/// One descriptor moves the unit one tile. With traces enabled the unit
/// leaves a synthetic, non-counted wall on every tile it departs, laid
/// from the post-step hook so simulation forks lay them identically.
#[derive(Clone, Debug)]
pub struct ArenaRules {
    steps_per_tile: u32,
    lay_traces: bool,
    policy: CollisionPolicy,
}

impl ArenaRules {
    /// Rules for units moving at `speed` px/s over `tile_distance` px
    /// tiles, animated at `fps` frames per second.
    #[must_use]
    pub fn new(speed: f32, tile_distance: f32, fps: u32) -> Self {
        Self {
            steps_per_tile: ShortMove::frame_count(tile_distance, speed, fps),
            lay_traces: false,
            policy: CollisionPolicy::default(),
        }
    }

    /// Rules that resolve one whole tile per frame, for headless runs.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            steps_per_tile: 1,
            lay_traces: false,
            policy: CollisionPolicy::default(),
        }
    }

    /// Leave a wall behind on every departed tile.
    #[must_use]
    pub fn with_traces(mut self) -> Self {
        self.lay_traces = true;
        self
    }

    /// Override the collision policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Frames one single-tile move takes.
    #[must_use]
    pub fn steps_per_tile(&self) -> u32 {
        self.steps_per_tile
    }
}

impl GameRules for ArenaRules {
    type Descriptor = Direction;

    fn collision_policy(&self) -> CollisionPolicy {
        self.policy
    }

    fn is_descriptor_allowed(_descriptor: &Direction) -> bool {
        // Every variant is well-formed; feasibility is checked later.
        true
    }

    fn possible_descriptors(&self) -> Vec<Direction> {
        Direction::ALL.to_vec()
    }

    fn create_move(
        &self,
        core: &GameCore,
        unit: UnitId,
        descriptor: &Direction,
    ) -> Result<BoxedPath, MoveRejected> {
        if !core.is_alive(unit) {
            return Err(MoveRejected::new("unit is dead"));
        }
        let from = core
            .tile_of(unit)
            .ok_or_else(|| MoveRejected::new("unit is not on the board"))?;
        let to = descriptor.apply(from);
        if !core.board().is_walkable(to) {
            return Err(MoveRejected::new(format!("tile {to} is blocked")));
        }

        let hooks = if self.lay_traces {
            PathHooks::new().on_post_step(|core, unit, from, _to| {
                if let Some(team) = core.unit(unit).map(|u| u.team) {
                    // The departed tile was just walked on; spawning
                    // cannot fail on it.
                    let _ = core.spawn_synthetic(team, unit, from);
                }
            })
        } else {
            PathHooks::new()
        };
        Ok(Box::new(ListPath::with_hooks(
            unit,
            vec![to],
            self.steps_per_tile,
            hooks,
        )))
    }

    fn encode(&self, descriptor: &Direction) -> u32 {
        match descriptor {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    fn decode(&self, code: u32) -> Option<Direction> {
        Direction::ALL.get(code as usize).copied()
    }
}
