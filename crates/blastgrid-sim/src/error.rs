//! Error types for the simulation layer.

use blastgrid_protocol::PlayerId;

/// Map generation failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Either dimension is too small for four non-overlapping 2×2
    /// spawn corners.
    #[error("invalid grid dimensions {width}x{height} (minimum is {min}x{min})", min = crate::grid::MIN_DIMENSION)]
    InvalidDimensions { width: usize, height: usize },
}

/// Errors surfaced by [`Simulation`](crate::Simulation) operations.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The id does not belong to any player in this match.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error(transparent)]
    Grid(#[from] GridError),
}
