//! Generator-driven path.

use crate::core::{TileId, UnitId};
use crate::rules::core::GameCore;

use super::{MoveError, Path, PathHooks, PathState, StepOutcome, Stepper};

/// Closure producing the next destination from the unit's current tile.
pub type TileGenerator = Box<dyn FnMut(&GameCore, UnitId, TileId) -> Option<TileId> + Send>;

/// A path whose tiles come from a generator closure, one at a time.
///
/// Used for open-ended motion — a bike that keeps riding in its current
/// direction until told otherwise. The generator is consulted each time a
/// step completes; returning `None` ends the path. A generator that yields
/// nothing on its first call produces a zero-length path.
pub struct ContinuousPath {
    stepper: Stepper,
    generator: TileGenerator,
}

impl ContinuousPath {
    /// Create a generator path, each hop taking `steps_per_tile` frames.
    #[must_use]
    pub fn new(
        unit: UnitId,
        steps_per_tile: u32,
        generator: impl FnMut(&GameCore, UnitId, TileId) -> Option<TileId> + Send + 'static,
    ) -> Self {
        Self::with_hooks(unit, steps_per_tile, generator, PathHooks::new())
    }

    /// Create a generator path with lifecycle hooks attached.
    #[must_use]
    pub fn with_hooks(
        unit: UnitId,
        steps_per_tile: u32,
        generator: impl FnMut(&GameCore, UnitId, TileId) -> Option<TileId> + Send + 'static,
        hooks: PathHooks,
    ) -> Self {
        Self {
            stepper: Stepper::new(unit, steps_per_tile, hooks),
            generator: Box::new(generator),
        }
    }
}

impl Path for ContinuousPath {
    fn unit(&self) -> UnitId {
        self.stepper.unit()
    }

    fn state(&self) -> PathState {
        self.stepper.state()
    }

    fn perform_next_step(&mut self, core: &mut GameCore) -> Result<StepOutcome, MoveError> {
        self.stepper.advance(core, &mut *self.generator)
    }

    fn stop(&mut self, cancel_post_hooks: bool) {
        self.stepper.stop(cancel_post_hooks);
    }
}
