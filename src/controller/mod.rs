//! Controllers and their thread wrappers.
//!
//! A [`Controller`] is the pure decision logic of one unit: it reacts to
//! events and, when asked, proposes a move descriptor. The
//! [`ControllerWrapper`] runs a controller on its own named thread behind
//! three channels, so a slow bot can never stall the orchestrator tick —
//! the orchestrator polls with `try_recv` and moves on.
//!
//! Capabilities are trait methods, not subclasses: a controller that wants
//! keyboard input says so via [`Controller::wants_input`]; the wrapper and
//! orchestrator never care whether the implementation behind the trait is
//! a human mapping or a search.

pub mod bot;
pub mod human;

pub use bot::BotController;
pub use human::HumanController;

use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use tracing::{debug, trace, warn};

use crate::core::UnitId;
use crate::events::{ControlEvent, ControllerEvent, MoveEvent, TeamMessage};
use crate::rules::GameRules;

/// Decision logic for one unit.
pub trait Controller: Send + 'static {
    type Rules: GameRules;

    /// The unit this controller commands.
    fn unit(&self) -> UnitId;

    /// Whether raw input events should be routed here.
    fn wants_input(&self) -> bool {
        false
    }

    /// Absorb one gameplay event.
    fn react_to_event(&mut self, event: &ControllerEvent<<Self::Rules as GameRules>::Descriptor>);

    /// Produce the controller's currently intended move, if any.
    ///
    /// Called once per wrapper iteration; expensive controllers do their
    /// thinking here, on the wrapper thread.
    fn poll_pending_move(&mut self) -> Option<<Self::Rules as GameRules>::Descriptor>;

    /// Absorb a message from a teammate.
    fn receive_team_message(&mut self, _message: &TeamMessage) {}

    /// Produce an outgoing payload for the teammate link, if any.
    fn poll_team_message(&mut self) -> Option<Vec<i64>> {
        None
    }
}

/// Handle to a controller running on its own thread.
///
/// Dropping the handle without sending [`ControlEvent::End`] first leaks
/// the thread; [`WrapperHandle::shutdown`] does both.
pub struct WrapperHandle<R: GameRules> {
    unit: UnitId,
    events_tx: Sender<ControllerEvent<R::Descriptor>>,
    control_tx: Sender<ControlEvent>,
    moves_rx: Receiver<MoveEvent<R::Descriptor>>,
    team_tx: Sender<TeamMessage>,
    team_rx: Receiver<TeamMessage>,
    wants_input: bool,
    join: Option<thread::JoinHandle<()>>,
}

impl<R: GameRules> WrapperHandle<R> {
    /// The wrapped controller's unit.
    #[must_use]
    pub fn unit(&self) -> UnitId {
        self.unit
    }

    /// Whether raw input events should be forwarded to this controller.
    #[must_use]
    pub fn wants_input(&self) -> bool {
        self.wants_input
    }

    /// Forward a gameplay event. Send failures mean the thread is already
    /// gone and are ignored.
    pub fn send_event(&self, event: ControllerEvent<R::Descriptor>) {
        let _ = self.events_tx.send(event);
    }

    /// Deliver a lifecycle notification on the side channel.
    pub fn send_control(&self, event: ControlEvent) {
        let _ = self.control_tx.send(event);
    }

    /// Take every proposed move currently queued, oldest first.
    pub fn drain_moves(&self) -> Vec<MoveEvent<R::Descriptor>> {
        let mut moves = Vec::new();
        while let Ok(event) = self.moves_rx.try_recv() {
            moves.push(event);
        }
        moves
    }

    /// Deliver a teammate's message to the controller.
    pub fn send_team_message(&self, message: TeamMessage) {
        let _ = self.team_tx.send(message);
    }

    /// Take every outgoing teammate message currently queued.
    pub fn drain_team_messages(&self) -> Vec<TeamMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.team_rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    /// Signal the thread to end and join it.
    pub fn shutdown(&mut self) {
        let _ = self.control_tx.send(ControlEvent::End);
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                warn!(unit = %self.unit, "controller thread panicked");
            }
        }
    }
}

/// Spawns controllers onto dedicated threads.
pub struct ControllerWrapper;

impl ControllerWrapper {
    /// Interval between polls when nothing is happening.
    const IDLE_POLL: Duration = Duration::from_millis(1);

    /// Run `controller` on its own named thread and return the handle.
    pub fn spawn<C>(controller: C) -> std::io::Result<WrapperHandle<C::Rules>>
    where
        C: Controller,
    {
        let unit = controller.unit();
        let wants_input = controller.wants_input();
        let (events_tx, events_rx) = unbounded();
        let (control_tx, control_rx) = unbounded();
        let (moves_tx, moves_rx) = unbounded();
        let (team_in_tx, team_in_rx) = unbounded();
        let (team_out_tx, team_out_rx) = unbounded();

        let join = thread::Builder::new()
            .name(format!("controller-{}", unit.0))
            .spawn(move || {
                run_controller(controller, events_rx, control_rx, moves_tx, team_in_rx, team_out_tx)
            })?;

        Ok(WrapperHandle {
            unit,
            events_tx,
            control_tx,
            moves_rx,
            team_tx: team_in_tx,
            team_rx: team_out_rx,
            wants_input,
            join: Some(join),
        })
    }
}

fn run_controller<C: Controller>(
    mut controller: C,
    events_rx: Receiver<ControllerEvent<<C::Rules as GameRules>::Descriptor>>,
    control_rx: Receiver<ControlEvent>,
    moves_tx: Sender<MoveEvent<<C::Rules as GameRules>::Descriptor>>,
    team_in_rx: Receiver<TeamMessage>,
    team_out_tx: Sender<TeamMessage>,
) {
    let unit = controller.unit();
    let mut alive = true;
    debug!(unit = %unit, "controller thread started");

    'outer: loop {
        loop {
            match control_rx.try_recv() {
                Ok(ControlEvent::End) => break 'outer,
                Ok(ControlEvent::UnitKilled(id)) if id == unit => alive = false,
                Ok(ControlEvent::UnitRevived(id)) if id == unit => alive = true,
                Ok(_) => {}
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'outer,
            }
        }

        while let Ok(event) = events_rx.try_recv() {
            controller.react_to_event(&event);
        }
        while let Ok(message) = team_in_rx.try_recv() {
            controller.receive_team_message(&message);
        }

        if let Some(payload) = controller.poll_team_message() {
            if team_out_tx.send(TeamMessage { from: unit, payload }).is_err() {
                break;
            }
        }

        if alive {
            if let Some(descriptor) = controller.poll_pending_move() {
                // Static filtering: malformed descriptors never reach the
                // orchestrator.
                if C::Rules::is_descriptor_allowed(&descriptor) {
                    if moves_tx.send(MoveEvent { unit, descriptor }).is_err() {
                        break;
                    }
                } else {
                    trace!(unit = %unit, "dropped disallowed descriptor");
                }
            }
        }

        thread::sleep(ControllerWrapper::IDLE_POLL);
    }

    debug!(unit = %unit, "controller thread stopped");
}
