//! Core protocol types for Blastgrid's wire format.
//!
//! Everything in this module travels "on the wire": it is what clients
//! send and what the server echoes back inside lobby and game messages.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's identifier inside one room.
///
/// Assigned by the room in join order starting at 1, and never reused for
/// the lifetime of the room: a player who disconnects mid-match keeps
/// their id so diffs that mention them stay meaningful.
///
/// `#[serde(transparent)]` makes `PlayerId(3)` serialize as plain `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a room (one lobby plus at most one match).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the four grid directions. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in the order explosions propagate.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// The unit step `(dx, dy)` for this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// `true` for left and right.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Dense index, handy for per-direction arrays.
    pub fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// ClientMessage: everything a client can send
// ---------------------------------------------------------------------------

/// Messages a client sends to the server.
///
/// `#[serde(tag = "type", content = "payload")]` produces "adjacently
/// tagged" JSON:
///
/// ```text
/// { "type": "JOIN_GAME", "payload": { "nickname": "ada" } }
/// { "type": "PLACE_BOMB" }
/// ```
///
/// `PLACE_BOMB` carries no data, so its `payload` may be omitted or null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Ask to be matched into a lobby.
    JoinGame { nickname: String },

    /// Start holding a direction key.
    StartMoving { direction: Direction },

    /// Release a direction key.
    StopMoving { direction: Direction },

    /// Drop a bomb on the current cell.
    PlaceBomb,

    /// Say something to everyone in the room.
    SendChatMessage { message: String },
}

impl ClientMessage {
    /// The wire name of this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinGame { .. } => "JOIN_GAME",
            Self::StartMoving { .. } => "START_MOVING",
            Self::StopMoving { .. } => "STOP_MOVING",
            Self::PlaceBomb => "PLACE_BOMB",
            Self::SendChatMessage { .. } => "SEND_CHAT_MESSAGE",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
