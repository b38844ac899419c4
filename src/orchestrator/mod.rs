//! Real-time main loop.
//!
//! The [`MainLoop`] owns the live [`GameApi`] and the controller wrappers
//! and advances the session one frame per [`MainLoop::step`]. Every frame
//! it drains its channels without blocking, promotes at most one pending
//! move per unit, advances each in-flight path by exactly one step and
//! reacts to failures per their variant: an illegal move kills the unit, a
//! blocked move cancels the unit's queue, an inconsistency aborts the
//! session.
//!
//! [`MainLoop::run`] wraps `step` in a fixed-rate frame clock; headless
//! drivers and tests call `step` directly instead.

use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use rustc_hash::FxHashMap;
use tracing::{debug, info, trace};

use crate::api::GameApi;
use crate::controller::{Controller, ControllerWrapper, WrapperHandle};
use crate::core::{TileId, UnitId};
use crate::events::{ControlEvent, ControllerEvent, LoopCommand};
use crate::path::{BoxedPath, MoveError};
use crate::rules::{ConsistencyError, GameOutcome, GameRules};

/// Default frame rate of [`MainLoop::run`].
pub const DEFAULT_FPS: u32 = 60;

/// What a frame decided about the loop's future.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Keep ticking.
    Continue,
    /// Paused; frames pass but the game does not advance.
    Pause,
    /// Quit was requested from outside.
    End,
    /// The game reached its outcome.
    Finish(GameOutcome),
}

/// A move in flight: the path plus the descriptor it came from, kept so
/// every completed hop can be broadcast to bot replicas.
struct ActiveMove<R: GameRules> {
    path: BoxedPath,
    descriptor: R::Descriptor,
}

/// The real-time orchestrator of one game session.
pub struct MainLoop<R: GameRules> {
    api: GameApi<R>,
    fps: u32,
    wrappers: FxHashMap<UnitId, WrapperHandle<R>>,
    in_flight: FxHashMap<UnitId, ActiveMove<R>>,
    pending: FxHashMap<UnitId, R::Descriptor>,
    input_tx: Sender<ControllerEvent<R::Descriptor>>,
    input_rx: Receiver<ControllerEvent<R::Descriptor>>,
    command_tx: Sender<LoopCommand>,
    command_rx: Receiver<LoopCommand>,
    paused: bool,
}

impl<R: GameRules> MainLoop<R> {
    /// Wrap a live session at the default frame rate.
    #[must_use]
    pub fn new(api: GameApi<R>) -> Self {
        Self::with_fps(api, DEFAULT_FPS)
    }

    /// Wrap a live session ticking at `fps` frames per second.
    #[must_use]
    pub fn with_fps(api: GameApi<R>, fps: u32) -> Self {
        let (input_tx, input_rx) = unbounded();
        let (command_tx, command_rx) = unbounded();
        Self {
            api,
            fps: fps.max(1),
            wrappers: FxHashMap::default(),
            in_flight: FxHashMap::default(),
            pending: FxHashMap::default(),
            input_tx,
            input_rx,
            command_tx,
            command_rx,
            paused: false,
        }
    }

    /// The live session state.
    #[must_use]
    pub fn api(&self) -> &GameApi<R> {
        &self.api
    }

    /// Mutable session state, for setup before the loop starts.
    #[must_use]
    pub fn api_mut(&mut self) -> &mut GameApi<R> {
        &mut self.api
    }

    /// Sender the presentation layer pushes raw input events into.
    #[must_use]
    pub fn input_sender(&self) -> Sender<ControllerEvent<R::Descriptor>> {
        self.input_tx.clone()
    }

    /// Sender for out-of-band loop commands (pause, quit).
    #[must_use]
    pub fn command_sender(&self) -> Sender<LoopCommand> {
        self.command_tx.clone()
    }

    /// Spawn a controller onto its own thread and register it.
    pub fn add_controller<C>(&mut self, controller: C) -> std::io::Result<()>
    where
        C: Controller<Rules = R>,
    {
        let handle = ControllerWrapper::spawn(controller)?;
        self.wrappers.insert(handle.unit(), handle);
        Ok(())
    }

    /// Advance the session by exactly one frame.
    pub fn step(&mut self) -> Result<LoopState, ConsistencyError> {
        while let Ok(command) = self.command_rx.try_recv() {
            match command {
                LoopCommand::TogglePause => {
                    self.paused = !self.paused;
                    debug!(paused = self.paused, "pause toggled");
                }
                LoopCommand::Quit => {
                    info!("quit requested");
                    self.shutdown();
                    return Ok(LoopState::End);
                }
            }
        }
        if self.paused {
            return Ok(LoopState::Pause);
        }

        self.forward_inputs();
        self.relay_team_messages();
        self.collect_moves();

        let alive_before = self.live_units();
        self.advance_paths()?;
        self.broadcast_deaths(&alive_before);

        if let Some(outcome) = self.api.check_if_finished() {
            info!(?outcome, "game finished");
            self.broadcast_control(ControlEvent::End);
            self.shutdown();
            return Ok(LoopState::Finish(outcome));
        }
        Ok(LoopState::Continue)
    }

    /// Tick at the configured frame rate until the session ends.
    ///
    /// Returns the outcome when the game finished, `None` when it was
    /// quit from outside.
    pub fn run(&mut self) -> Result<Option<GameOutcome>, ConsistencyError> {
        let frame = Duration::from_secs_f64(1.0 / f64::from(self.fps));
        loop {
            let started = Instant::now();
            match self.step()? {
                LoopState::Continue | LoopState::Pause => {}
                LoopState::End => return Ok(None),
                LoopState::Finish(outcome) => return Ok(Some(outcome)),
            }
            if let Some(remaining) = frame.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    /// Route raw input events to the controllers that asked for them.
    fn forward_inputs(&mut self) {
        while let Ok(event) = self.input_rx.try_recv() {
            for handle in self.wrappers.values().filter(|h| h.wants_input()) {
                handle.send_event(event.clone());
            }
        }
    }

    /// Route teammate messages: each outgoing message reaches every other
    /// controller on the sender's team, and nobody else.
    fn relay_team_messages(&mut self) {
        let outgoing: Vec<_> = self
            .wrappers
            .values()
            .flat_map(|handle| handle.drain_team_messages())
            .collect();
        for message in outgoing {
            let Some(team) = self.api.core().unit(message.from).map(|u| u.team) else {
                continue;
            };
            for handle in self.wrappers.values() {
                if handle.unit() == message.from {
                    continue;
                }
                let teammate = self
                    .api
                    .core()
                    .unit(handle.unit())
                    .is_some_and(|u| u.team == team);
                if teammate {
                    handle.send_team_message(message.clone());
                }
            }
        }
    }

    /// Drain proposed moves from every wrapper, last writer wins per unit.
    ///
    /// A proposal for a unit with an in-flight path requests a cooperative
    /// stop: the current step finishes, the old path ends at a tile
    /// boundary with its post-path hook suppressed, and the new move is
    /// promoted on a later frame.
    fn collect_moves(&mut self) {
        for handle in self.wrappers.values() {
            for event in handle.drain_moves() {
                if !self.api.core().is_alive(event.unit) {
                    continue;
                }
                trace!(unit = %event.unit, "move proposed");
                if let Some(active) = self.in_flight.get_mut(&event.unit) {
                    active.path.stop(true);
                }
                self.pending.insert(event.unit, event.descriptor);
            }
        }
    }

    /// Promote pending moves, then advance every in-flight path one step.
    ///
    /// Two separate passes: every unit's pending descriptor is turned into
    /// a path against the same start-of-frame state before any unit moves,
    /// so validation cannot depend on which unit advances first.
    fn advance_paths(&mut self) -> Result<(), ConsistencyError> {
        let units: Vec<UnitId> = self
            .wrappers
            .keys()
            .copied()
            .filter(|u| self.api.core().is_alive(*u))
            .collect();

        for &unit in &units {
            if self.in_flight.contains_key(&unit) {
                continue;
            }
            let Some(descriptor) = self.pending.remove(&unit) else {
                continue;
            };
            match self.api.rules().create_move(self.api.core(), unit, &descriptor) {
                Ok(path) => {
                    self.in_flight.insert(unit, ActiveMove { path, descriptor });
                }
                Err(rejected) => {
                    // Expected and recoverable: drop it.
                    trace!(unit = %unit, %rejected, "move rejected");
                }
            }
        }

        for &unit in &units {
            let Some(active) = self.in_flight.get_mut(&unit) else {
                continue;
            };
            match active.path.perform_next_step(self.api.core_mut()) {
                Ok(outcome) => {
                    // Every completed hop changed the authoritative state
                    // and must reach the replicas, whether the path went on
                    // to complete or was stopped mid-move.
                    let arrived = outcome
                        .tile
                        .map(|tile| (active.descriptor.clone(), tile));
                    if active.path.state().is_terminal() {
                        self.in_flight.remove(&unit);
                    }
                    if let Some((descriptor, tile)) = arrived {
                        self.broadcast_move(unit, descriptor, tile);
                    }
                }
                Err(MoveError::Illegal { from, to }) => {
                    debug!(unit = %unit, %from, %to, "illegal move, unit forfeits");
                    self.in_flight.remove(&unit);
                    self.pending.remove(&unit);
                    self.api.core_mut().kill_unit(unit);
                }
                Err(MoveError::Impossible { to }) => {
                    debug!(unit = %unit, %to, "blocked move, queue cancelled");
                    self.in_flight.remove(&unit);
                    self.pending.remove(&unit);
                }
                Err(MoveError::Inconsistent { unit, expected }) => {
                    return Err(ConsistencyError::InconsistentState {
                        reason: format!("{unit} expected on {expected} during its move"),
                    });
                }
                Err(MoveError::Consistency(err)) => return Err(err),
            }
        }
        Ok(())
    }

    fn live_units(&self) -> Vec<UnitId> {
        self.api
            .core()
            .units()
            .filter(|u| u.alive())
            .map(|u| u.id)
            .collect()
    }

    /// Notify controllers of units that died this frame.
    fn broadcast_deaths(&mut self, alive_before: &[UnitId]) {
        for &unit in alive_before {
            if !self.api.core().is_alive(unit) {
                debug!(unit = %unit, "unit died");
                self.in_flight.remove(&unit);
                self.pending.remove(&unit);
                self.broadcast_control(ControlEvent::UnitKilled(unit));
            }
        }
    }

    /// Replay a completed hop to every controller (bot replicas need it).
    fn broadcast_move(&self, unit: UnitId, descriptor: R::Descriptor, tile: TileId) {
        for handle in self.wrappers.values() {
            handle.send_event(ControllerEvent::Move {
                unit,
                descriptor: descriptor.clone(),
                tile,
            });
        }
    }

    fn broadcast_control(&self, event: ControlEvent) {
        for handle in self.wrappers.values() {
            handle.send_control(event.clone());
        }
    }

    /// End and join every controller thread.
    fn shutdown(&mut self) {
        for handle in self.wrappers.values_mut() {
            handle.shutdown();
        }
        self.wrappers.clear();
        self.in_flight.clear();
        self.pending.clear();
    }
}

impl<R: GameRules> Drop for MainLoop<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
