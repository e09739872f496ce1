//! Error types for the room layer.
//!
//! The `Display` text of these errors is what a client sees in an
//! `ERROR` message, so keep it readable.

use blastgrid_protocol::RoomId;
use blastgrid_transport::ConnectionId;

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// No more player slots available.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The connection already has a seat in a live room.
    #[error("connection {0} is already in room {1}")]
    AlreadyInRoom(ConnectionId, RoomId),

    /// The connection has no seat in this room.
    #[error("connection {0} is not in room {1}")]
    NotInRoom(ConnectionId, RoomId),

    /// The room is in a state that doesn't allow this operation, for
    /// example joining a match that already started.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
