//! Replica-driven bot controller.

use tracing::warn;

use crate::api::GameApi;
use crate::core::UnitId;
use crate::events::ControllerEvent;
use crate::rules::GameRules;

use super::Controller;

/// Closure choosing the bot's next move from its replica state.
pub type Planner<R> =
    Box<dyn FnMut(&GameApi<R>, UnitId) -> Option<<R as GameRules>::Descriptor> + Send>;

/// A controller that thinks on a private replica of the game.
///
/// The orchestrator broadcasts every completed hop; the bot replays them
/// onto its fork and re-plans whenever the replica changed. Planning
/// happens on the wrapper thread, off the real-time loop, and the replica
/// never sees presentation state at all.
pub struct BotController<R: GameRules> {
    unit: UnitId,
    replica: GameApi<R>,
    planner: Planner<R>,
    /// Replica changed since the last plan.
    dirty: bool,
}

impl<R: GameRules> BotController<R> {
    /// Create a bot over a fork of the starting state.
    #[must_use]
    pub fn new(
        unit: UnitId,
        replica: GameApi<R>,
        planner: impl FnMut(&GameApi<R>, UnitId) -> Option<R::Descriptor> + Send + 'static,
    ) -> Self {
        Self {
            unit,
            replica,
            planner: Box::new(planner),
            dirty: true,
        }
    }

    /// The bot's private replica, for tests and diagnostics.
    #[must_use]
    pub fn replica(&self) -> &GameApi<R> {
        &self.replica
    }
}

impl<R: GameRules> Controller for BotController<R> {
    type Rules = R;

    fn unit(&self) -> UnitId {
        self.unit
    }

    fn react_to_event(&mut self, event: &ControllerEvent<R::Descriptor>) {
        if let ControllerEvent::Move { unit, descriptor, tile } = event {
            // Replay through the rules so hooks run on the replica too,
            // but only keep the fork when it lands where the live state
            // says the unit landed (or reproduced its death there).
            let agreed = self.replica.simulate_move(*unit, descriptor).filter(|fork| {
                !fork.core().is_alive(*unit) || fork.core().tile_of(*unit) == Some(*tile)
            });
            match agreed {
                Some(fork) => self.replica = fork,
                None => {
                    // The replica has drifted; fall back to placing the
                    // unit on the broadcast tile.
                    warn!(unit = %unit, %tile, "bot replica drifted, repositioning");
                    if let Err(err) = self.replica.core_mut().update_game_state(*unit, *tile) {
                        warn!(unit = %unit, %err, "bot replica could not be repositioned");
                    }
                }
            }
            self.dirty = true;
            self.replica.check_if_finished();
        }
    }

    fn poll_pending_move(&mut self) -> Option<R::Descriptor> {
        if !self.dirty || self.replica.is_finished() || !self.replica.core().is_alive(self.unit) {
            return None;
        }
        self.dirty = false;
        (self.planner)(&self.replica, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::board::GridBoard;
    use crate::core::{TeamId, TileId, Unit};
    use crate::path::{BoxedPath, ListPath};
    use crate::rules::{CollisionPolicy, GameCore, MoveRejected};

    #[derive(Clone)]
    struct EastwardRules;

    impl GameRules for EastwardRules {
        type Descriptor = ();

        fn is_descriptor_allowed(_: &()) -> bool {
            true
        }

        fn possible_descriptors(&self) -> Vec<()> {
            vec![()]
        }

        fn create_move(
            &self,
            core: &GameCore,
            unit: UnitId,
            _d: &(),
        ) -> Result<BoxedPath, MoveRejected> {
            let from = core
                .tile_of(unit)
                .ok_or_else(|| MoveRejected::new("unit not placed"))?;
            let to = TileId::new(from.row, from.col + 1);
            if !core.board().is_walkable(to) {
                return Err(MoveRejected::new("edge of board"));
            }
            Ok(Box::new(ListPath::new(unit, vec![to], 1)))
        }

        fn encode(&self, _d: &()) -> u32 {
            0
        }

        fn decode(&self, code: u32) -> Option<()> {
            (code == 0).then_some(())
        }
    }

    fn replica() -> GameApi<EastwardRules> {
        let mut core = GameCore::new(
            Arc::new(GridBoard::new(2, 4)),
            CollisionPolicy::default(),
        );
        core.add_unit(Unit::new(UnitId::player(0), TeamId(0)), TileId::new(0, 0))
            .unwrap();
        core.add_unit(Unit::new(UnitId::player(1), TeamId(1)), TileId::new(1, 0))
            .unwrap();
        GameApi::new(core, EastwardRules)
    }

    #[test]
    fn test_plans_once_per_change() {
        let mut bot = BotController::new(UnitId::player(0), replica(), |_, _| Some(()));

        assert_eq!(bot.poll_pending_move(), Some(()));
        // No replica change in between: nothing new to say.
        assert_eq!(bot.poll_pending_move(), None);

        bot.react_to_event(&ControllerEvent::Move {
            unit: UnitId::player(1),
            descriptor: (),
            tile: TileId::new(1, 1),
        });
        assert_eq!(bot.poll_pending_move(), Some(()));
    }

    #[test]
    fn test_replays_moves_onto_replica() {
        let mut bot = BotController::new(UnitId::player(0), replica(), |_, _| None);

        bot.react_to_event(&ControllerEvent::Move {
            unit: UnitId::player(1),
            descriptor: (),
            tile: TileId::new(1, 1),
        });
        assert_eq!(
            bot.replica().core().tile_of(UnitId::player(1)),
            Some(TileId::new(1, 1))
        );
    }

    /// When the descriptor replay lands somewhere else than the live
    /// state reported, the broadcast tile wins.
    #[test]
    fn test_broadcast_tile_overrides_drifted_replay() {
        let mut bot = BotController::new(UnitId::player(0), replica(), |_, _| None);

        // Eastward replay would land on (1, 1); the live state says the
        // unit ended up on (1, 2).
        bot.react_to_event(&ControllerEvent::Move {
            unit: UnitId::player(1),
            descriptor: (),
            tile: TileId::new(1, 2),
        });
        assert_eq!(
            bot.replica().core().tile_of(UnitId::player(1)),
            Some(TileId::new(1, 2))
        );
    }

    #[test]
    fn test_silent_while_dead() {
        let mut bot = BotController::new(UnitId::player(0), replica(), |_, _| Some(()));
        bot.replica.core_mut().kill_unit(UnitId::player(0));

        assert_eq!(bot.poll_pending_move(), None);
    }

    #[test]
    fn test_no_input_routing() {
        let bot = BotController::new(UnitId::player(0), replica(), |_, _| None);
        assert!(!bot.wants_input());
    }
}
