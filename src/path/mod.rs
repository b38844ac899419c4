//! Move/path state machine.
//!
//! A path animates one unit across the board as a sequence of atomic
//! single-tile [`ShortMove`]s, advanced one frame per call. Paths are
//! produced fresh by the game rules for each move descriptor and are never
//! reused or restarted.
//!
//! ## Lifecycle
//!
//! *not started* → *running* → *completed* (ran out of steps) or
//! *stopped* (cancelled, or the unit died mid-flight). Pre-path and
//! post-path hooks fire once per path; pre-step and post-step hooks fire
//! once per step. Cancellation is cooperative: [`Path::stop`] marks the
//! path, the in-flight step still finishes (a unit is never left between
//! tiles), and the transition is observed at the next call.
//!
//! ## Failure semantics
//!
//! Step failures are values, not unwinding: [`Path::perform_next_step`]
//! returns a [`MoveError`] and the caller reacts to the variant — an
//! illegal move is fatal for the acting unit, a blocked move just cancels
//! the pending queue, an inconsistency aborts the session.

pub mod continuous;
pub mod list_path;
pub mod short_move;

pub use continuous::ContinuousPath;
pub use list_path::ListPath;
pub use short_move::ShortMove;

use thiserror::Error;

use crate::core::{TileId, UnitId};
use crate::rules::core::GameCore;
use crate::rules::ConsistencyError;

/// A failed move step.
#[derive(Debug, Error)]
pub enum MoveError {
    /// The destination is not adjacent to the source. Fatal for the acting
    /// unit.
    #[error("move to {to} is not adjacent to {from}")]
    Illegal { from: TileId, to: TileId },

    /// The destination tile cannot be walked on. The move is cancelled and
    /// may be retried.
    #[error("tile {to} cannot be walked on")]
    Impossible { to: TileId },

    /// The moving unit is not on the tile the move starts from. Occupancy
    /// can no longer be trusted; fatal for the session.
    #[error("{unit} is not on the expected source tile {expected}")]
    Inconsistent { unit: UnitId, expected: TileId },

    /// State-consistency failure raised while applying the step.
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}

/// Lifecycle state of a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathState {
    NotStarted,
    Running,
    /// Ran out of steps.
    Completed,
    /// Cancelled, or the unit died mid-flight.
    Stopped,
}

impl PathState {
    /// Whether the path will never advance again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, PathState::Completed | PathState::Stopped)
    }
}

/// Result of advancing a path by one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// A new step started this frame.
    pub just_started: bool,
    /// A step completed this frame.
    pub just_completed: bool,
    /// The tile the unit arrived on, when a step completed.
    pub tile: Option<TileId>,
}

impl StepOutcome {
    /// The all-false outcome returned by finished paths.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Hook fired at a path boundary.
pub type PathHook = Box<dyn FnMut(&mut GameCore, UnitId) + Send>;
/// Hook fired at a step boundary with (source, destination) tiles.
pub type StepHook = Box<dyn FnMut(&mut GameCore, UnitId, TileId, TileId) + Send>;

/// Lifecycle hooks of a path.
///
/// Game rules attach behavior here: a Tron-like game lays its trace from
/// the post-step hook, Sokoban pushes the box from the pre-step hook.
#[derive(Default)]
pub struct PathHooks {
    pre_path: Option<PathHook>,
    pre_step: Option<StepHook>,
    post_step: Option<StepHook>,
    post_path: Option<PathHook>,
}

impl PathHooks {
    /// No hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once before the first step of the path.
    #[must_use]
    pub fn on_pre_path(mut self, hook: impl FnMut(&mut GameCore, UnitId) + Send + 'static) -> Self {
        self.pre_path = Some(Box::new(hook));
        self
    }

    /// Fire before each step starts.
    #[must_use]
    pub fn on_pre_step(
        mut self,
        hook: impl FnMut(&mut GameCore, UnitId, TileId, TileId) + Send + 'static,
    ) -> Self {
        self.pre_step = Some(Box::new(hook));
        self
    }

    /// Fire after each step completes.
    #[must_use]
    pub fn on_post_step(
        mut self,
        hook: impl FnMut(&mut GameCore, UnitId, TileId, TileId) + Send + 'static,
    ) -> Self {
        self.post_step = Some(Box::new(hook));
        self
    }

    /// Fire once when the path completes or is stopped without suppression.
    #[must_use]
    pub fn on_post_path(mut self, hook: impl FnMut(&mut GameCore, UnitId) + Send + 'static) -> Self {
        self.post_path = Some(Box::new(hook));
        self
    }
}

/// A stateful, non-restartable sequence of short moves.
pub trait Path: Send {
    /// The unit this path moves.
    fn unit(&self) -> UnitId;

    /// Current lifecycle state.
    fn state(&self) -> PathState;

    /// Advance exactly one frame.
    ///
    /// Calling this on a finished path is a no-op returning
    /// [`StepOutcome::none`], any number of times.
    fn perform_next_step(&mut self, core: &mut GameCore) -> Result<StepOutcome, MoveError>;

    /// Request cooperative cancellation.
    ///
    /// The in-flight step still finishes; the path then transitions to
    /// *stopped*. With `cancel_post_hooks` the terminal post-path hook is
    /// suppressed.
    fn stop(&mut self, cancel_post_hooks: bool);

    /// Drain all remaining steps synchronously and return the final tile.
    ///
    /// Only for finite, non-animated moves (inside simulation forks);
    /// never call this from the real-time loop, and never on an unbounded
    /// generator path.
    fn complete(&mut self, core: &mut GameCore) -> Result<Option<TileId>, MoveError> {
        let mut last = None;
        while !self.state().is_terminal() {
            let outcome = self.perform_next_step(core)?;
            if let Some(tile) = outcome.tile {
                last = Some(tile);
            }
        }
        Ok(last)
    }
}

/// Owned path trait object, as stored by the orchestrator.
pub type BoxedPath = Box<dyn Path>;

/// Shared step-machine driving [`ListPath`] and [`ContinuousPath`].
///
/// The wrapper supplies the next destination tile through a closure; the
/// stepper owns the lifecycle, the in-flight [`ShortMove`] and the hooks.
pub(crate) struct Stepper {
    unit: UnitId,
    steps_per_tile: u32,
    state: PathState,
    current: Option<ShortMove>,
    hooks: PathHooks,
    stop_requested: bool,
    cancel_post: bool,
}

impl Stepper {
    pub(crate) fn new(unit: UnitId, steps_per_tile: u32, hooks: PathHooks) -> Self {
        Self {
            unit,
            steps_per_tile: steps_per_tile.max(1),
            state: PathState::NotStarted,
            current: None,
            hooks,
            stop_requested: false,
            cancel_post: false,
        }
    }

    pub(crate) fn unit(&self) -> UnitId {
        self.unit
    }

    pub(crate) fn state(&self) -> PathState {
        self.state
    }

    pub(crate) fn stop(&mut self, cancel_post_hooks: bool) {
        self.stop_requested = true;
        if cancel_post_hooks {
            self.cancel_post = true;
        }
    }

    /// Transition to a terminal state, firing the post-path hook at most
    /// once.
    fn finish(&mut self, core: &mut GameCore, terminal: PathState) {
        self.current = None;
        self.state = terminal;
        let suppressed = terminal == PathState::Stopped && self.cancel_post;
        if !suppressed {
            if let Some(mut hook) = self.hooks.post_path.take() {
                hook(core, self.unit);
            }
        } else {
            self.hooks.post_path = None;
        }
    }

    pub(crate) fn advance(
        &mut self,
        core: &mut GameCore,
        next_tile: &mut dyn FnMut(&GameCore, UnitId, TileId) -> Option<TileId>,
    ) -> Result<StepOutcome, MoveError> {
        match self.state {
            PathState::Completed | PathState::Stopped => return Ok(StepOutcome::none()),
            PathState::NotStarted => {
                if self.stop_requested {
                    self.finish(core, PathState::Stopped);
                    return Ok(StepOutcome::none());
                }
                if let Some(mut hook) = self.hooks.pre_path.take() {
                    hook(core, self.unit);
                }
                self.state = PathState::Running;
            }
            PathState::Running => {}
        }

        // A unit that died mid-flight stops its path at the next poll.
        if !core.is_alive(self.unit) {
            self.finish(core, PathState::Stopped);
            return Ok(StepOutcome::none());
        }

        let mut just_started = false;
        if self.current.is_none() {
            if self.stop_requested {
                self.finish(core, PathState::Stopped);
                return Ok(StepOutcome::none());
            }

            let from = core.position_of(self.unit)?;
            match next_tile(core, self.unit, from) {
                Some(to) => {
                    if let Some(hook) = self.hooks.pre_step.as_mut() {
                        hook(core, self.unit, from, to);
                    }
                    self.current = Some(ShortMove::new(self.unit, from, to, self.steps_per_tile));
                    just_started = true;
                }
                None => {
                    // Zero remaining steps: the path completes immediately.
                    self.finish(core, PathState::Completed);
                    return Ok(StepOutcome::none());
                }
            }
        }

        let Some(mv) = self.current.as_mut() else {
            return Ok(StepOutcome::none());
        };
        let (from, to) = (mv.source(), mv.destination());

        match mv.perform_step(core) {
            Err(err) => {
                // The in-progress step is aborted; the caller decides what
                // the failure means for the unit.
                self.current = None;
                self.state = PathState::Stopped;
                Err(err)
            }
            Ok(false) => Ok(StepOutcome {
                just_started,
                just_completed: false,
                tile: None,
            }),
            Ok(true) => {
                self.current = None;
                if let Some(hook) = self.hooks.post_step.as_mut() {
                    hook(core, self.unit, from, to);
                }
                if self.stop_requested {
                    self.finish(core, PathState::Stopped);
                }
                Ok(StepOutcome {
                    just_started,
                    just_completed: true,
                    tile: Some(to),
                })
            }
        }
    }
}
