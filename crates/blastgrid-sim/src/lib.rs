//! The Blastgrid game simulation.
//!
//! Everything here is synchronous and deterministic for a given RNG: the
//! room actor feeds it intent events and a fixed `dt` each tick, then
//! drains the [`ChangeLog`] and broadcasts it as a diff.
//!
//! - [`grid`] generates the tile map.
//! - [`Simulation`] owns players, bombs, explosions and power-ups.
//! - [`change`] defines the change kinds and the [`Snapshot`] they
//!   replay onto.

mod config;
mod error;
mod player;

pub mod change;
pub mod engine;
pub mod grid;

pub use change::{BombView, Change, ChangeLog, PlayerView, PowerUp, PowerUpKind, Snapshot};
pub use config::SimConfig;
pub use engine::Simulation;
pub use error::{GridError, SimError};
pub use grid::{Position, Tile, TileGrid};
pub use player::{Motion, MoveIntent, Player};
