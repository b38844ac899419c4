//! Path state-machine integration tests.
//!
//! These exercise the full move lifecycle against a real board and rules
//! core: frame counts, hook ordering, cancellation and death mid-flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use grid_arena::board::GridBoard;
use grid_arena::core::{TeamId, TileId, Unit, UnitId};
use grid_arena::path::{ContinuousPath, ListPath, MoveError, Path, PathHooks, PathState};
use grid_arena::rules::{CollisionPolicy, GameCore};

fn core_with_unit(rows: i16, cols: i16, at: TileId) -> (GameCore, UnitId) {
    let mut core = GameCore::new(
        Arc::new(GridBoard::new(rows, cols)),
        CollisionPolicy::default(),
    );
    let unit = UnitId::player(0);
    core.add_unit(Unit::new(unit, TeamId(0)), at).unwrap();
    (core, unit)
}

// =============================================================================
// Frame counts
// =============================================================================

/// A 30 px tile at 30 px/s and 60 FPS takes exactly 60 frames, and the
/// unit's position changes only on the final frame.
#[test]
fn test_sixty_frames_per_tile() {
    let (mut core, unit) = core_with_unit(2, 2, TileId::new(0, 0));
    let mut path = ListPath::new(unit, vec![TileId::new(0, 1)], 60);

    for frame in 0..59 {
        path.perform_next_step(&mut core).unwrap();
        assert_eq!(
            core.tile_of(unit),
            Some(TileId::new(0, 0)),
            "moved early on frame {frame}"
        );
    }
    let outcome = path.perform_next_step(&mut core).unwrap();
    assert!(outcome.just_completed);
    assert_eq!(core.tile_of(unit), Some(TileId::new(0, 1)));
    assert_eq!(path.state(), PathState::Completed);
}

/// An empty tile list completes without moving anything.
#[test]
fn test_zero_length_path_completes_immediately() {
    let (mut core, unit) = core_with_unit(2, 2, TileId::new(0, 0));
    let mut path = ListPath::new(unit, vec![], 10);

    let outcome = path.perform_next_step(&mut core).unwrap();
    assert!(!outcome.just_completed);
    assert_eq!(path.state(), PathState::Completed);
    assert_eq!(core.tile_of(unit), Some(TileId::new(0, 0)));
}

// =============================================================================
// Idempotence
// =============================================================================

/// Stepping a finished path any number of times changes nothing.
#[test]
fn test_finished_path_is_inert() {
    let (mut core, unit) = core_with_unit(2, 2, TileId::new(0, 0));
    let mut path = ListPath::new(unit, vec![TileId::new(0, 1)], 1);

    path.perform_next_step(&mut core).unwrap();
    assert_eq!(path.state(), PathState::Completed);

    for _ in 0..5 {
        let outcome = path.perform_next_step(&mut core).unwrap();
        assert!(!outcome.just_completed);
        assert!(!outcome.just_started);
    }
    assert_eq!(core.tile_of(unit), Some(TileId::new(0, 1)));
}

// =============================================================================
// Hooks
// =============================================================================

/// Path hooks fire once, step hooks fire once per step.
#[test]
fn test_hook_cardinality() {
    let (mut core, unit) = core_with_unit(1, 4, TileId::new(0, 0));

    let pre_path = Arc::new(AtomicU32::new(0));
    let post_path = Arc::new(AtomicU32::new(0));
    let pre_step = Arc::new(AtomicU32::new(0));
    let post_step = Arc::new(AtomicU32::new(0));
    let (a, b, c, d) = (
        pre_path.clone(),
        post_path.clone(),
        pre_step.clone(),
        post_step.clone(),
    );

    let hooks = PathHooks::new()
        .on_pre_path(move |_, _| {
            a.fetch_add(1, Ordering::SeqCst);
        })
        .on_pre_step(move |_, _, _, _| {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .on_post_step(move |_, _, _, _| {
            d.fetch_add(1, Ordering::SeqCst);
        })
        .on_post_path(move |_, _| {
            b.fetch_add(1, Ordering::SeqCst);
        });

    let tiles = vec![TileId::new(0, 1), TileId::new(0, 2), TileId::new(0, 3)];
    let mut path = ListPath::with_hooks(unit, tiles, 2, hooks);
    while !path.state().is_terminal() {
        path.perform_next_step(&mut core).unwrap();
    }

    assert_eq!(pre_path.load(Ordering::SeqCst), 1);
    assert_eq!(pre_step.load(Ordering::SeqCst), 3);
    assert_eq!(post_step.load(Ordering::SeqCst), 3);
    assert_eq!(post_path.load(Ordering::SeqCst), 1);
}

/// Cancelling with hook suppression skips the post-path hook only.
#[test]
fn test_cancellation_suppresses_post_path_hook() {
    let (mut core, unit) = core_with_unit(1, 4, TileId::new(0, 0));

    let post_path = Arc::new(AtomicU32::new(0));
    let counter = post_path.clone();
    let hooks = PathHooks::new().on_post_path(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let tiles = vec![TileId::new(0, 1), TileId::new(0, 2)];
    let mut path = ListPath::with_hooks(unit, tiles, 2, hooks);

    // Start the first step, then cancel mid-flight.
    path.perform_next_step(&mut core).unwrap();
    path.stop(true);

    // The in-flight step still finishes; the unit lands on a tile.
    path.perform_next_step(&mut core).unwrap();
    assert_eq!(core.tile_of(unit), Some(TileId::new(0, 1)));

    path.perform_next_step(&mut core).unwrap();
    assert_eq!(path.state(), PathState::Stopped);
    assert_eq!(post_path.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Death and failure
// =============================================================================

/// A path whose unit died stops at the next poll instead of erroring.
#[test]
fn test_death_stops_path() {
    let (mut core, unit) = core_with_unit(1, 4, TileId::new(0, 0));
    let mut path = ListPath::new(unit, vec![TileId::new(0, 1), TileId::new(0, 2)], 1);

    path.perform_next_step(&mut core).unwrap();
    core.kill_unit(unit);

    let outcome = path.perform_next_step(&mut core).unwrap();
    assert!(!outcome.just_completed);
    assert_eq!(path.state(), PathState::Stopped);
}

/// A non-adjacent hop fails as an illegal move.
#[test]
fn test_non_adjacent_step_is_illegal() {
    let (mut core, unit) = core_with_unit(3, 3, TileId::new(0, 0));
    let mut path = ListPath::new(unit, vec![TileId::new(2, 2)], 1);

    let err = path.perform_next_step(&mut core).unwrap_err();
    assert!(matches!(err, MoveError::Illegal { .. }));
    assert_eq!(path.state(), PathState::Stopped);
}

/// A hop into a wall fails as an impossible move; the unit stays put.
#[test]
fn test_walled_step_is_impossible() {
    let board = GridBoard::new(2, 2).with_wall(TileId::new(0, 1));
    let mut core = GameCore::new(Arc::new(board), CollisionPolicy::default());
    let unit = UnitId::player(0);
    core.add_unit(Unit::new(unit, TeamId(0)), TileId::new(0, 0))
        .unwrap();

    let mut path = ListPath::new(unit, vec![TileId::new(0, 1)], 1);
    let err = path.perform_next_step(&mut core).unwrap_err();
    assert!(matches!(err, MoveError::Impossible { .. }));
    assert_eq!(core.tile_of(unit), Some(TileId::new(0, 0)));
}

// =============================================================================
// Generator paths
// =============================================================================

/// A generator path keeps walking until the generator runs dry, then the
/// draining helper reports the final tile.
#[test]
fn test_continuous_path_runs_generator_dry() {
    let (mut core, unit) = core_with_unit(1, 5, TileId::new(0, 0));

    // Keep heading right until the wall of the world.
    let mut path = ContinuousPath::new(unit, 1, |core, _, from| {
        let next = TileId::new(from.row, from.col + 1);
        core.board().is_walkable(next).then_some(next)
    });

    let landed = path.complete(&mut core).unwrap();
    assert_eq!(landed, Some(TileId::new(0, 4)));
    assert_eq!(path.state(), PathState::Completed);
}

/// Requesting a stop ends a generator path at the next tile boundary.
#[test]
fn test_continuous_path_stops_cooperatively() {
    let (mut core, unit) = core_with_unit(1, 10, TileId::new(0, 0));
    let mut path = ContinuousPath::new(unit, 2, |core, _, from| {
        let next = TileId::new(from.row, from.col + 1);
        core.board().is_walkable(next).then_some(next)
    });

    // Frame 1 starts the first hop; the stop lands mid-step.
    path.perform_next_step(&mut core).unwrap();
    path.stop(false);
    path.perform_next_step(&mut core).unwrap();
    path.perform_next_step(&mut core).unwrap();

    assert_eq!(path.state(), PathState::Stopped);
    assert_eq!(core.tile_of(unit), Some(TileId::new(0, 1)));
}
