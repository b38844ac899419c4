//! Forkable game API.
//!
//! [`GameApi`] bundles a [`GameCore`] with the [`GameRules`] that drive it
//! and is the surface everything above the rules layer talks to: the
//! orchestrator mutates the live instance, bots and the search fork it and
//! mutate the forks. A fork is a full clone — cheap thanks to the `im`
//! collections underneath — and nothing a fork does can ever reach the
//! parent.

use thiserror::Error;
use tracing::{error, trace};

use crate::core::{TileId, UnitId};
use crate::path::MoveError;
use crate::rules::{GameCore, GameOutcome, GameRules, MoveRejected};

/// Failure decoding a dense move code back into a descriptor.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The code is the no-move sentinel; there is no descriptor to recover.
    #[error("code marks a frame without a completed move")]
    NoHistory,

    /// The code is the dead-unit sentinel.
    #[error("code marks a dead unit")]
    DeadUnit,

    /// The code is outside the game's descriptor space.
    #[error("code {0} is outside the descriptor space")]
    OutOfRange(u32),
}

/// A move that could not be carried out, keeping the two failure classes
/// apart: a rejection never even produced a path and is always
/// recoverable, a step failure carries its own severity in the
/// [`MoveError`] variant.
#[derive(Debug, Error)]
pub enum MoveFailure {
    /// The rules declined to create the move.
    #[error(transparent)]
    Rejected(#[from] MoveRejected),

    /// The path was created but a step failed while draining it.
    #[error(transparent)]
    Step(#[from] MoveError),
}

impl MoveFailure {
    /// Whether the failure means state consistency can no longer be
    /// trusted.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MoveFailure::Step(MoveError::Inconsistent { .. } | MoveError::Consistency(_))
        )
    }
}

/// A forkable game session: rules plus core state.
#[derive(Clone)]
pub struct GameApi<R: GameRules> {
    core: GameCore,
    rules: R,
}

impl<R: GameRules> GameApi<R> {
    /// Sentinel code: the unit completed no move this frame.
    pub const ENCODE_NO_MOVE: u32 = 0;
    /// Sentinel code: the unit is dead.
    pub const ENCODE_DEAD: u32 = 1;

    /// Wrap a core and its rules.
    #[must_use]
    pub fn new(core: GameCore, rules: R) -> Self {
        Self { core, rules }
    }

    /// The rules in force.
    #[must_use]
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Read access to the core state.
    #[must_use]
    pub fn core(&self) -> &GameCore {
        &self.core
    }

    /// Mutable access to the core state, for the orchestrator.
    #[must_use]
    pub fn core_mut(&mut self) -> &mut GameCore {
        &mut self.core
    }

    /// An independent copy of the whole session.
    #[must_use]
    pub fn fork(&self) -> Self {
        self.clone()
    }

    // === Moves ===

    /// Build and synchronously drain a move on *this* instance.
    ///
    /// The only in-place mutator of the API: the orchestrator animates
    /// moves frame by frame instead, but forks and headless drivers apply
    /// them atomically through here.
    pub fn perform_move(
        &mut self,
        unit: UnitId,
        descriptor: &R::Descriptor,
    ) -> Result<Option<TileId>, MoveFailure> {
        let mut path = self.rules.create_move(&self.core, unit, descriptor)?;
        Ok(path.complete(&mut self.core)?)
    }

    /// Fork, apply one move on the fork, return the fork.
    ///
    /// `None` when the move is rejected or fails mid-flight — the caller
    /// treats the combination as infeasible. Consistency-class failures
    /// are logged at error level before the fork is discarded.
    #[must_use]
    pub fn simulate_move(&self, unit: UnitId, descriptor: &R::Descriptor) -> Option<Self> {
        let mut fork = self.fork();
        match fork.perform_move(unit, descriptor) {
            Ok(_) => Some(fork),
            Err(failure) => {
                Self::discard_fork(unit, &failure);
                None
            }
        }
    }

    /// Fork, apply a batch of simultaneous moves in order, return the fork.
    ///
    /// Moves for units that died earlier in the same batch are skipped
    /// rather than failing the whole batch. `None` only when a surviving
    /// unit's move is infeasible.
    #[must_use]
    pub fn simulate_moves(&self, moves: &[(UnitId, R::Descriptor)]) -> Option<Self> {
        let mut fork = self.fork();
        for (unit, descriptor) in moves {
            if !fork.core.is_alive(*unit) {
                continue;
            }
            if let Err(failure) = fork.perform_move(*unit, descriptor) {
                Self::discard_fork(*unit, &failure);
                return None;
            }
        }
        Some(fork)
    }

    fn discard_fork(unit: UnitId, failure: &MoveFailure) {
        if failure.is_fatal() {
            error!(unit = %unit, %failure, "simulation fork hit a consistency failure");
        } else {
            trace!(unit = %unit, %failure, "simulated move discarded");
        }
    }

    /// Whether a single descriptor can currently be performed by `unit`.
    #[must_use]
    pub fn is_move_feasible(&self, unit: UnitId, descriptor: &R::Descriptor) -> bool {
        self.rules.create_move(&self.core, unit, descriptor).is_ok()
    }

    /// The candidates among `descriptors` that `unit` can currently attempt.
    #[must_use]
    pub fn filter_feasible_moves(
        &self,
        unit: UnitId,
        descriptors: &[R::Descriptor],
    ) -> Vec<R::Descriptor> {
        descriptors
            .iter()
            .filter(|d| self.is_move_feasible(unit, d))
            .cloned()
            .collect()
    }

    /// The subset of the game's full descriptor space `unit` can currently
    /// attempt.
    #[must_use]
    pub fn check_feasible_moves(&self, unit: UnitId) -> Vec<R::Descriptor> {
        self.filter_feasible_moves(unit, &self.rules.possible_descriptors())
    }

    // === Encoding ===

    /// Dense code for a completed move, shifted past the two sentinels.
    #[must_use]
    pub fn encode_move(&self, descriptor: &R::Descriptor) -> u32 {
        self.rules.encode(descriptor) + 2
    }

    /// Recover a descriptor from a dense code.
    ///
    /// Sentinel codes decode to dedicated errors so learning pipelines can
    /// tell "no move" from "dead" from garbage.
    pub fn decode_move(&self, code: u32) -> Result<R::Descriptor, DecodeError> {
        match code {
            Self::ENCODE_NO_MOVE => Err(DecodeError::NoHistory),
            Self::ENCODE_DEAD => Err(DecodeError::DeadUnit),
            _ => self
                .rules
                .decode(code - 2)
                .ok_or(DecodeError::OutOfRange(code)),
        }
    }

    // === Termination ===

    /// Check (and memoize) whether the game is finished.
    pub fn check_if_finished(&mut self) -> Option<GameOutcome> {
        self.core.check_if_finished().cloned()
    }

    /// Whether a finished outcome has already been recorded.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.core.outcome().is_some()
    }

    /// The recorded outcome, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.core.outcome()
    }
}
