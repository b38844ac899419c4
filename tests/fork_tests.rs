//! Fork-isolation integration tests.
//!
//! Forks must be complete, independent copies: no sequence of moves on a
//! fork may ever leak into its parent, and vice versa.

use std::sync::Arc;

use proptest::prelude::*;

use grid_arena::api::GameApi;
use grid_arena::board::GridBoard;
use grid_arena::core::{TeamId, TileId, Unit, UnitId};
use grid_arena::games::{ArenaRules, Direction};
use grid_arena::rules::{CollisionPolicy, GameCore};

fn two_player_api(rules: ArenaRules) -> GameApi<ArenaRules> {
    let mut core = GameCore::new(Arc::new(GridBoard::new(6, 6)), CollisionPolicy::default());
    core.add_unit(Unit::new(UnitId::player(0), TeamId(0)), TileId::new(0, 0))
        .unwrap();
    core.add_unit(Unit::new(UnitId::player(1), TeamId(1)), TileId::new(5, 5))
        .unwrap();
    GameApi::new(core, rules)
}

fn snapshot(api: &GameApi<ArenaRules>) -> Vec<(UnitId, Option<TileId>, bool)> {
    let mut units: Vec<_> = api
        .core()
        .units()
        .map(|u| (u.id, api.core().tile_of(u.id), u.alive()))
        .collect();
    units.sort_by_key(|(id, _, _)| *id);
    units
}

// =============================================================================
// Direct isolation
// =============================================================================

#[test]
fn test_fork_does_not_see_parent_moves() {
    let mut api = two_player_api(ArenaRules::instant());
    let fork = api.fork();

    api.perform_move(UnitId::player(0), &Direction::Right).unwrap();
    api.perform_move(UnitId::player(0), &Direction::Down).unwrap();

    assert_eq!(fork.core().tile_of(UnitId::player(0)), Some(TileId::new(0, 0)));
    assert_eq!(api.core().tile_of(UnitId::player(0)), Some(TileId::new(1, 1)));
}

#[test]
fn test_parent_does_not_see_fork_deaths() {
    let api = two_player_api(ArenaRules::instant());
    let mut fork = api.fork();

    fork.core_mut().kill_unit(UnitId::player(1));
    fork.check_if_finished();

    assert!(fork.is_finished());
    assert!(!api.is_finished());
    assert!(api.core().is_alive(UnitId::player(1)));
}

#[test]
fn test_fork_traces_stay_in_fork() {
    let api = two_player_api(ArenaRules::instant().with_traces());
    let fork = api
        .simulate_move(UnitId::player(0), &Direction::Right)
        .unwrap();

    // The trace laid on the departed tile exists only in the fork.
    assert_eq!(fork.core().occupants(TileId::new(0, 0)).count(), 1);
    assert_eq!(api.core().occupants(TileId::new(0, 0)).count(), 1);
    assert_eq!(
        api.core().occupants(TileId::new(0, 0)).collect::<Vec<_>>(),
        vec![UnitId::player(0)]
    );
    assert!(api.core().unit(UnitId(-1)).is_none());
}

/// Synthetic id allocation is part of the forked state: both sides
/// allocate the same ids independently.
#[test]
fn test_forks_allocate_identical_synthetic_ids() {
    let api = two_player_api(ArenaRules::instant().with_traces());

    let fork_a = api.simulate_move(UnitId::player(0), &Direction::Right).unwrap();
    let fork_b = api.simulate_move(UnitId::player(1), &Direction::Left).unwrap();

    assert!(fork_a.core().unit(UnitId(-1)).is_some());
    assert!(fork_b.core().unit(UnitId(-1)).is_some());
    assert_eq!(fork_a.core().unit(UnitId(-1)).unwrap().owner, Some(UnitId::player(0)));
    assert_eq!(fork_b.core().unit(UnitId(-1)).unwrap().owner, Some(UnitId::player(1)));
}

// =============================================================================
// Property: random move sequences never leak
// =============================================================================

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Right),
        Just(Direction::Down),
        Just(Direction::Left),
    ]
}

proptest! {
    #[test]
    fn prop_fork_mutations_never_reach_parent(
        moves in prop::collection::vec((0u8..2, direction_strategy()), 0..40)
    ) {
        let api = two_player_api(ArenaRules::instant().with_traces());
        let before = snapshot(&api);

        let mut fork = api.fork();
        for (player, direction) in moves {
            // Infeasible moves are simply dropped, like the live loop does.
            let _ = fork.perform_move(UnitId::player(player), &direction);
            fork.check_if_finished();
        }

        prop_assert_eq!(snapshot(&api), before);
        prop_assert!(api.core().occupancy().is_consistent());
        prop_assert!(fork.core().occupancy().is_consistent());
    }
}
