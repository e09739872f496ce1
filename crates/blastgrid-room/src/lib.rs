//! Lobbies and matches for Blastgrid.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! roster, its timers and, while a match runs, the simulation. Nothing
//! is shared between rooms.
//!
//! # Key types
//!
//! - [`RoomDirectory`]: matchmaking and routing from connections to rooms
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomStatus`]: waiting → countdown → in progress → terminated
//! - [`Gateway`] / [`ServerMessage`]: encode once, fan out to the roster
//! - [`RoomConfig`]: player limits, timers, tick rate, simulation tuning

mod config;
mod directory;
mod error;
mod gateway;
mod room;

pub use config::{RoomConfig, RoomStatus};
pub use directory::RoomDirectory;
pub use error::RoomError;
pub use gateway::{
    ConnectionSender, Frame, Gateway, LobbyPlayer, OUTBOUND_QUEUE_CAPACITY, ServerMessage,
};
pub use room::{RoomHandle, RoomInfo};
