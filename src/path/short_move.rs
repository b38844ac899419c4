//! Atomic single-tile move.

use crate::core::{TileId, UnitId};
use crate::rules::core::GameCore;

use super::MoveError;

/// An atomic transition between two adjacent tiles.
///
/// The move is validated once, when its first step runs: the unit must be
/// on the source tile, the destination must be walkable, and the two tiles
/// must be adjacent. It then completes after a precomputed number of frame
/// steps; the final step snaps the unit exactly onto the destination (no
/// fractional drift survives a move) and applies the occupancy update
/// through [`GameCore::update_game_state`].
pub struct ShortMove {
    unit: UnitId,
    source: TileId,
    destination: TileId,
    total_steps: u32,
    steps_done: u32,
    started: bool,
    finished: bool,
}

impl ShortMove {
    /// Create a move taking `total_steps` frames (clamped to at least one).
    #[must_use]
    pub fn new(unit: UnitId, source: TileId, destination: TileId, total_steps: u32) -> Self {
        Self {
            unit,
            source,
            destination,
            total_steps: total_steps.max(1),
            steps_done: 0,
            started: false,
            finished: false,
        }
    }

    /// Number of frames a move takes for a unit travelling at
    /// `speed` px/s over `distance` px at `fps` frames per second.
    ///
    /// ```
    /// use grid_arena::path::ShortMove;
    ///
    /// // 30 px apart, 30 px/s, 60 FPS: exactly 60 frames.
    /// assert_eq!(ShortMove::frame_count(30.0, 30.0, 60), 60);
    /// ```
    #[must_use]
    pub fn frame_count(distance: f32, speed: f32, fps: u32) -> u32 {
        assert!(speed > 0.0, "unit speed must be positive");
        ((distance / speed) * fps as f32).ceil().max(1.0) as u32
    }

    /// The moving unit.
    #[must_use]
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    /// The tile the move starts from.
    #[must_use]
    pub fn source(&self) -> TileId {
        self.source
    }

    /// The tile the move ends on.
    #[must_use]
    pub fn destination(&self) -> TileId {
        self.destination
    }

    /// Whether the move has run all its steps.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Fraction of the move already travelled, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.steps_done as f32 / self.total_steps as f32
    }

    fn validate(&self, core: &GameCore) -> Result<(), MoveError> {
        if !core.board().are_neighbours(self.source, self.destination) {
            return Err(MoveError::Illegal {
                from: self.source,
                to: self.destination,
            });
        }
        if !core.board().is_walkable(self.destination) {
            return Err(MoveError::Impossible {
                to: self.destination,
            });
        }
        let actual = core.position_of(self.unit)?;
        if actual != self.source {
            return Err(MoveError::Inconsistent {
                unit: self.unit,
                expected: self.source,
            });
        }
        Ok(())
    }

    /// Advance one frame. Returns `true` when this frame completed the
    /// move. Calling after completion is a no-op returning `false`.
    pub fn perform_step(&mut self, core: &mut GameCore) -> Result<bool, MoveError> {
        if self.finished {
            return Ok(false);
        }
        if !self.started {
            self.validate(core)?;
            self.started = true;
        }

        self.steps_done += 1;
        if self.steps_done >= self.total_steps {
            self.finished = true;
            core.update_game_state(self.unit, self.destination)?;
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count() {
        assert_eq!(ShortMove::frame_count(30.0, 30.0, 60), 60);
        assert_eq!(ShortMove::frame_count(30.0, 60.0, 60), 30);
        assert_eq!(ShortMove::frame_count(32.0, 64.0, 30), 15);
        // Never zero frames, even for absurd speeds.
        assert_eq!(ShortMove::frame_count(1.0, 10_000.0, 30), 1);
    }

    #[test]
    fn test_progress() {
        let mv = ShortMove::new(
            UnitId::player(0),
            TileId::new(0, 0),
            TileId::new(0, 1),
            4,
        );
        assert_eq!(mv.progress(), 0.0);
        assert!(!mv.finished());
    }
}
