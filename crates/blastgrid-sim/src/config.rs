//! Simulation tuning.

use serde::{Deserialize, Serialize};

/// Tunables for one match.
///
/// Distances are in cells, times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Map width in cells.
    pub width: usize,
    /// Map height in cells.
    pub height: usize,
    /// Probability that a free non-corner cell starts as a block.
    pub block_density: f64,
    /// Probability that a destroyed block leaves a power-up behind.
    pub powerup_chance: f64,
    /// Seconds from placement to detonation.
    pub bomb_fuse: f32,
    /// Seconds an explosion cell stays visible.
    pub explosion_duration: f32,
    pub starting_lives: u32,
    pub starting_bombs: u32,
    pub starting_flame: u32,
    pub starting_speed: f32,
    /// Upper bound for the speed multiplier.
    pub max_speed: f32,
    /// Speed multiplier gained per extra-speed power-up.
    pub speed_step: f32,
    /// Cells per second at speed multiplier 1.0.
    pub base_speed: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 15,
            height: 13,
            block_density: 0.75,
            powerup_chance: 0.3,
            bomb_fuse: 3.0,
            explosion_duration: 0.5,
            starting_lives: 3,
            starting_bombs: 1,
            starting_flame: 1,
            starting_speed: 1.0,
            max_speed: 3.0,
            speed_step: 0.5,
            base_speed: 4.0,
        }
    }
}
