//! # Blastgrid
//!
//! Authoritative server for a real-time multiplayer grid bombing game.
//!
//! Browser clients connect over WebSocket, send `JOIN_GAME` and are
//! matched into rooms of up to four. Each room runs its own lobby,
//! countdown and fixed-rate simulation, broadcasting per-tick diffs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blastgrid::prelude::*;
//!
//! # async fn run() -> Result<(), BlastgridError> {
//! let server = BlastgridServer::builder().bind("0.0.0.0:8080").build().await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::BlastgridError;
pub use server::{BlastgridServer, BlastgridServerBuilder};

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::{BlastgridError, BlastgridServer, BlastgridServerBuilder};
    pub use blastgrid_protocol::{ClientMessage, Direction, PlayerId, RoomId};
    pub use blastgrid_room::{LobbyPlayer, RoomConfig, RoomStatus, ServerMessage};
    pub use blastgrid_sim::{Change, SimConfig, Snapshot};
}
