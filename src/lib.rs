//! # grid-arena
//!
//! A tile-grid game engine with forkable state, real-time orchestration
//! and simultaneous-move search.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: No hardcoded directions, win conditions or move
//!    shapes. Games plug in through the `GameRules` trait.
//!
//! 2. **Forkable State**: Bots and search plan on O(1) clones of the live
//!    state (persistent data structures via `im`); nothing a fork does can
//!    reach the parent.
//!
//! 3. **Status Over Unwinding**: Move failures are values with explicit
//!    severities — dropped, unit forfeits, queue cancelled, session
//!    aborted — never control-flow exceptions.
//!
//! 4. **Core/Presentation Split**: The engine owns positions, lives and
//!    outcomes; rendering state never enters the forkable core.
//!
//! ## Modules
//!
//! - `core`: Tile and unit identifiers, teams, deterministic RNG
//! - `board`: Read-only tile geometry, the grid board, shortest paths
//! - `path`: The move/path state machine advanced one frame at a time
//! - `rules`: The forkable rules core and the `GameRules` plug-in seam
//! - `api`: The forkable session facade consumed by bots and search
//! - `events`: Typed messages between orchestrator and controllers
//! - `controller`: Human/bot decision logic and their thread wrappers
//! - `orchestrator`: The fixed-rate real-time main loop
//! - `search`: Simultaneous-move alpha-beta over state forks
//! - `games`: Bundled reference game used by the integration tests

pub mod api;
pub mod board;
pub mod controller;
pub mod core;
pub mod events;
pub mod games;
pub mod orchestrator;
pub mod path;
pub mod rules;
pub mod search;

// Re-export commonly used types
pub use crate::core::{GameRng, TeamId, TileId, Unit, UnitId};

pub use crate::board::{shortest_path, Board, GridBoard, Tile};

pub use crate::path::{
    BoxedPath, ContinuousPath, ListPath, MoveError, Path, PathHooks, PathState, ShortMove,
    StepOutcome,
};

pub use crate::rules::{
    CollisionPolicy, ConsistencyError, GameCore, GameOutcome, GameRules, MoveRejected,
    OccupancyMap,
};

pub use crate::api::{DecodeError, GameApi, MoveFailure};

pub use crate::events::{
    ControlEvent, ControllerEvent, KeyboardEvent, LoopCommand, MouseEvent, MoveEvent, TeamMessage,
};

pub use crate::controller::{BotController, Controller, ControllerWrapper, HumanController, WrapperHandle};

pub use crate::orchestrator::{LoopState, MainLoop, DEFAULT_FPS};

pub use crate::search::{Evaluator, SearchConfig, SimultaneousAlphaBeta};

pub use crate::games::{ArenaRules, Direction};
