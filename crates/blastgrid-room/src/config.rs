//! Room configuration and lifecycle states.

use std::fmt;
use std::time::Duration;

use blastgrid_sim::SimConfig;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room the directory creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Players needed before the lobby timer starts.
    pub min_players: usize,

    /// Roster size that skips the lobby timer and starts the countdown.
    pub max_players: usize,

    /// How long a lobby with `min_players` waits for more players.
    pub lobby_wait: Duration,

    /// First value of the pre-match countdown.
    pub countdown_from: u32,

    /// Time between countdown steps.
    pub countdown_interval: Duration,

    /// Simulation ticks per second during a match.
    pub tick_rate: u32,

    /// Seed for map generation and power-up drops. `None` draws from
    /// the OS for every match.
    pub rng_seed: Option<u64>,

    pub sim: SimConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 4,
            lobby_wait: Duration::from_secs(20),
            countdown_from: 10,
            countdown_interval: Duration::from_secs(1),
            tick_rate: 60,
            rng_seed: None,
            sim: SimConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
/// Waiting ⇄ Countdown → InProgress → Terminated
/// ```
///
/// - **Waiting**: accepting joins. With `min_players` the lobby timer
///   runs; at `max_players` the countdown starts at once.
/// - **Countdown**: counting down to the match. A leave sends the room
///   back to Waiting.
/// - **InProgress**: the simulation is ticking. No joins.
/// - **Terminated**: the match is over. Chat still works; the room is
///   removed once the last connection leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Countdown,
    InProgress,
    Terminated,
}

impl RoomStatus {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Waiting)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waiting => "waiting",
            Self::Countdown => "countdown",
            Self::InProgress => "in_progress",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_status_is_joinable() {
        assert!(RoomStatus::Waiting.is_joinable());
        assert!(!RoomStatus::Countdown.is_joinable());
        assert!(!RoomStatus::InProgress.is_joinable());
        assert!(!RoomStatus::Terminated.is_joinable());
    }

    #[test]
    fn test_room_status_display_matches_wire_name() {
        for status in [
            RoomStatus::Waiting,
            RoomStatus::Countdown,
            RoomStatus::InProgress,
            RoomStatus::Terminated,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn test_room_config_default() {
        let config = RoomConfig::default();
        assert_eq!(config.min_players, 2);
        assert_eq!(config.max_players, 4);
        assert_eq!(config.lobby_wait, Duration::from_secs(20));
        assert_eq!(config.countdown_from, 10);
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.sim.width, 15);
    }
}
