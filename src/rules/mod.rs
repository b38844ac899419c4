//! Rules core and the game-specific plug-in seam.
//!
//! [`core::GameCore`] owns everything forkable: units, teams, occupancy and
//! the termination memo. Games implement [`GameRules`] to define what a
//! move descriptor means — the engine stays agnostic about directions,
//! columns or target tiles.

pub mod core;
pub mod occupancy;

pub use self::core::GameCore;
pub use occupancy::OccupancyMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{TeamId, UnitId};
use crate::path::BoxedPath;

/// Fatal state-consistency failure.
///
/// These are programmer/integration errors: once one is raised the
/// occupancy invariants are no longer trustworthy and the session must be
/// aborted rather than silently continued.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),

    #[error("inconsistent game state: {reason}")]
    InconsistentState { reason: String },
}

/// A move that cannot even be attempted right now.
///
/// Recoverable and expected — callers drop the move silently. Not to be
/// confused with a [`MoveError`](crate::path::MoveError), which is a move
/// that was attempted and rejected mid-flight.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("move cannot be attempted: {reason}")]
pub struct MoveRejected {
    pub reason: String,
}

impl MoveRejected {
    /// Create a rejection with a human-readable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Rules controlling whether same-team or self collisions are lethal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionPolicy {
    /// Whether colliding with yourself (or an entity you own, like your
    /// own trace) kills you.
    pub suicide_allowed: bool,
    /// Whether collisions between same-team units are lethal.
    pub team_kill_allowed: bool,
}

impl CollisionPolicy {
    /// Both policies lethal.
    #[must_use]
    pub const fn lethal() -> Self {
        Self {
            suicide_allowed: true,
            team_kill_allowed: true,
        }
    }
}

/// Result of a finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// No team survived.
    Tie,
    /// Exactly one team survived.
    Win {
        team: TeamId,
        /// The surviving counted units of the winning team.
        units: Vec<UnitId>,
    },
}

impl GameOutcome {
    /// Check whether a unit is among the winners.
    #[must_use]
    pub fn is_winner(&self, unit: UnitId) -> bool {
        match self {
            GameOutcome::Tie => false,
            GameOutcome::Win { units, .. } => units.contains(&unit),
        }
    }
}

/// Game-specific rules: descriptor semantics, move construction, policy.
///
/// The engine calls these methods from the orchestrator, the simulation
/// layer and the search. Implementations must be cheap to clone — every
/// fork of the simulation layer carries one.
pub trait GameRules: Clone + Send + 'static {
    /// Opaque value identifying an intended action (a direction, a column,
    /// a target tile).
    type Descriptor: Clone + PartialEq + std::fmt::Debug + Send + 'static;

    /// Collision policy for this game.
    fn collision_policy(&self) -> CollisionPolicy {
        CollisionPolicy::default()
    }

    /// Pure static filter consulted before a controller's proposed move is
    /// ever forwarded to the orchestrator. Malformed or out-of-range
    /// descriptors are dropped, never forwarded.
    fn is_descriptor_allowed(descriptor: &Self::Descriptor) -> bool;

    /// The candidate descriptors a unit could attempt, used by bots and by
    /// the search to enumerate moves before feasibility filtering.
    fn possible_descriptors(&self) -> Vec<Self::Descriptor>;

    /// Translate a descriptor into a concrete path for `unit`.
    ///
    /// Returns [`MoveRejected`] when the move cannot even be attempted in
    /// the current state.
    fn create_move(
        &self,
        core: &GameCore,
        unit: UnitId,
        descriptor: &Self::Descriptor,
    ) -> Result<BoxedPath, MoveRejected>;

    /// Dense non-negative code for a descriptor. Must be a bijection with
    /// [`decode`](GameRules::decode) over the game's descriptor space.
    fn encode(&self, descriptor: &Self::Descriptor) -> u32;

    /// Inverse of [`encode`](GameRules::encode); `None` for codes outside
    /// the descriptor space.
    fn decode(&self, code: u32) -> Option<Self::Descriptor>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_winner() {
        let win = GameOutcome::Win {
            team: TeamId(1),
            units: vec![UnitId::player(2)],
        };
        assert!(win.is_winner(UnitId::player(2)));
        assert!(!win.is_winner(UnitId::player(0)));
        assert!(!GameOutcome::Tie.is_winner(UnitId::player(2)));
    }

    #[test]
    fn test_policy_defaults() {
        let policy = CollisionPolicy::default();
        assert!(!policy.suicide_allowed);
        assert!(!policy.team_kill_allowed);

        let lethal = CollisionPolicy::lethal();
        assert!(lethal.suicide_allowed);
        assert!(lethal.team_kill_allowed);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = GameOutcome::Win {
            team: TeamId(0),
            units: vec![UnitId::player(0), UnitId::player(1)],
        };
        let json = serde_json::to_string(&outcome).unwrap();
        let back: GameOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(outcome, back);
    }
}
