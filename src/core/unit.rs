//! Unit identification and the unit data model.
//!
//! ## ID layout
//!
//! - `0..` : player units, numbered by the game session
//! - negative ids: synthetic entities (traces, boxes) allocated by the
//!   rules core
//!
//! Identity is always passed explicitly through constructors; there is no
//! hidden global numbering.
//!
//! ## Liveness
//!
//! A unit carries a lives counter; it is alive while `lives > 0`. The
//! `counted` flag distinguishes player units (which count toward game
//! termination) from synthetic entities (which never do).

use serde::{Deserialize, Serialize};

/// Unique identifier for any game unit.
///
/// Player units have non-negative ids; synthetic entities (traces laid by a
/// bike, boxes pushed around) have negative ids.
///
/// ```
/// use grid_arena::core::UnitId;
///
/// let player = UnitId::player(2);
/// assert!(player.is_player());
///
/// let trace = UnitId(-1);
/// assert!(!trace.is_player());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub i32);

impl UnitId {
    /// Create a player unit id by player number.
    #[must_use]
    pub const fn player(number: u8) -> Self {
        Self(number as i32)
    }

    /// Check whether this id refers to a player unit.
    #[must_use]
    pub const fn is_player(self) -> bool {
        self.0 >= 0
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unit({})", self.0)
    }
}

/// Team identifier.
///
/// A unit belongs to exactly one team for its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u8);

impl TeamId {
    /// Create a team id.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Team {}", self.0)
    }
}

/// A game unit: identity, team, lives, and an optional owner link.
///
/// Synthetic entities set `owner` to the player unit that produced them
/// (a bike's trace, a pushed box); collision resolution uses the link to
/// recognize self-collisions. `counted` units are the ones the termination
/// check tallies per team.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub team: TeamId,
    /// Producing unit for synthetic entities; `None` for player units.
    pub owner: Option<UnitId>,
    /// Remaining lives; the unit is dead at zero.
    pub lives: i32,
    /// Whether this unit counts toward the termination check.
    pub counted: bool,
}

impl Unit {
    /// Create a player unit with one life.
    #[must_use]
    pub fn new(id: UnitId, team: TeamId) -> Self {
        Self {
            id,
            team,
            owner: None,
            lives: 1,
            counted: true,
        }
    }

    /// Create a synthetic, non-counted unit owned by `owner`.
    #[must_use]
    pub fn synthetic(id: UnitId, team: TeamId, owner: UnitId) -> Self {
        Self {
            id,
            team,
            owner: Some(owner),
            lives: 1,
            counted: false,
        }
    }

    /// Set the lives counter.
    #[must_use]
    pub fn with_lives(mut self, lives: i32) -> Self {
        self.lives = lives;
        self
    }

    /// Whether the unit is alive.
    #[must_use]
    pub fn alive(&self) -> bool {
        self.lives > 0
    }

    /// Take one life. Saturates at zero.
    pub fn kill(&mut self) {
        self.lives = (self.lives - 1).max(0);
    }

    /// Give one life back.
    pub fn revive(&mut self) {
        self.lives += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_ids() {
        assert_eq!(UnitId::player(0), UnitId(0));
        assert_eq!(UnitId::player(3), UnitId(3));
        assert!(UnitId::player(3).is_player());
        assert!(!UnitId(-2).is_player());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", UnitId(1)), "Unit(1)");
        assert_eq!(format!("{}", TeamId(2)), "Team 2");
    }

    #[test]
    fn test_liveness() {
        let mut unit = Unit::new(UnitId::player(0), TeamId(0));
        assert!(unit.alive());

        unit.kill();
        assert!(!unit.alive());

        // kill on a dead unit stays at zero
        unit.kill();
        assert_eq!(unit.lives, 0);

        unit.revive();
        assert!(unit.alive());
    }

    #[test]
    fn test_multiple_lives() {
        let mut unit = Unit::new(UnitId::player(1), TeamId(1)).with_lives(2);

        unit.kill();
        assert!(unit.alive());
        unit.kill();
        assert!(!unit.alive());
    }

    #[test]
    fn test_synthetic() {
        let owner = UnitId::player(0);
        let trace = Unit::synthetic(UnitId(-1), TeamId(0), owner);

        assert!(!trace.counted);
        assert_eq!(trace.owner, Some(owner));
        assert!(trace.alive());
    }

    #[test]
    fn test_serialization() {
        let unit = Unit::synthetic(UnitId(-4), TeamId(1), UnitId::player(2));
        let json = serde_json::to_string(&unit).unwrap();
        let back: Unit = serde_json::from_str(&json).unwrap();
        assert_eq!(unit, back);
    }
}
