//! Typed messages flowing between the orchestrator and controllers.
//!
//! Three distinct channels, three distinct message families: inputs fan
//! out as [`ControllerEvent`]s, proposed moves come back as plain
//! descriptors, and [`ControlEvent`]s carry lifecycle notifications on a
//! dedicated side channel so they are never queued behind gameplay
//! traffic.

use serde::{Deserialize, Serialize};

use crate::core::{TileId, UnitId};

/// A raw key press or release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    /// Platform-independent key code.
    pub key: u32,
    pub pressed: bool,
}

/// A mouse click, with the board tile under the cursor when there is one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MouseEvent {
    /// Window-space pixel position.
    pub pixel: (f32, f32),
    /// Which button, platform-numbered.
    pub button: u8,
    /// `true` on release, `false` on press.
    pub click_up: bool,
    /// The tile under the cursor, resolved by the presentation layer.
    pub tile: Option<TileId>,
}

/// A proposed move travelling from a controller to the orchestrator.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveEvent<D> {
    pub unit: UnitId,
    pub descriptor: D,
}

/// Gameplay event fanned out to controllers.
#[derive(Clone, Debug, PartialEq)]
pub enum ControllerEvent<D> {
    /// A unit completed one tile hop, landing on `tile`. Broadcast once
    /// per hop, even when the path was cancelled afterwards; bot
    /// controllers replay these onto their replica state.
    Move {
        unit: UnitId,
        descriptor: D,
        tile: TileId,
    },
    Keyboard(KeyboardEvent),
    Mouse(MouseEvent),
}

/// Lifecycle notification delivered on the control side channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlEvent {
    /// The session is over; the controller thread must wind down.
    End,
    UnitKilled(UnitId),
    UnitRevived(UnitId),
}

/// Free-form message between teammates, for coordinating bots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMessage {
    pub from: UnitId,
    pub payload: Vec<i64>,
}

/// Out-of-band command to the main loop itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopCommand {
    TogglePause,
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_event_serialization() {
        let event = ControlEvent::UnitKilled(UnitId::player(2));
        let json = serde_json::to_string(&event).unwrap();
        let back: ControlEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_mouse_event_tile_is_optional() {
        let off_board = MouseEvent {
            pixel: (12.0, 8.0),
            button: 1,
            click_up: true,
            tile: None,
        };
        let json = serde_json::to_string(&off_board).unwrap();
        let back: MouseEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tile, None);
    }
}
