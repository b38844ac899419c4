//! Finite tile-list path.

use std::collections::VecDeque;

use crate::core::{TileId, UnitId};
use crate::rules::core::GameCore;

use super::{MoveError, Path, PathHooks, PathState, StepOutcome, Stepper};

/// A path walking a unit along a fixed, finite list of tiles.
///
/// This is the path a click-to-walk move produces: the tile sequence comes
/// from the shortest-path helper and each consecutive pair becomes one
/// short move. An empty list completes immediately as a zero-length path.
pub struct ListPath {
    stepper: Stepper,
    tiles: VecDeque<TileId>,
}

impl ListPath {
    /// Create a path through `tiles`, each hop taking `steps_per_tile`
    /// frames.
    #[must_use]
    pub fn new(unit: UnitId, tiles: Vec<TileId>, steps_per_tile: u32) -> Self {
        Self::with_hooks(unit, tiles, steps_per_tile, PathHooks::new())
    }

    /// Create a path with lifecycle hooks attached.
    #[must_use]
    pub fn with_hooks(
        unit: UnitId,
        tiles: Vec<TileId>,
        steps_per_tile: u32,
        hooks: PathHooks,
    ) -> Self {
        Self {
            stepper: Stepper::new(unit, steps_per_tile, hooks),
            tiles: tiles.into(),
        }
    }

    /// Tiles not yet started.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tiles.len()
    }
}

impl Path for ListPath {
    fn unit(&self) -> UnitId {
        self.stepper.unit()
    }

    fn state(&self) -> PathState {
        self.stepper.state()
    }

    fn perform_next_step(&mut self, core: &mut GameCore) -> Result<StepOutcome, MoveError> {
        let tiles = &mut self.tiles;
        self.stepper.advance(core, &mut |_, _, _| tiles.pop_front())
    }

    fn stop(&mut self, cancel_post_hooks: bool) {
        self.stepper.stop(cancel_post_hooks);
    }
}
