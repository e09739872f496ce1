//! Tile map and its generator.

use blastgrid_protocol::Direction;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::GridError;

/// Smallest width or height that fits four disjoint 2×2 spawn corners.
pub const MIN_DIMENSION: usize = 4;

/// What occupies a cell of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tile {
    Empty,
    /// Destructible.
    Block,
    /// Indestructible pillar.
    Wall,
}

impl Tile {
    pub fn is_passable(self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A cell coordinate. `(0, 0)` is the top-left corner, `y` grows down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell `n` steps away in `dir`.
    pub fn step(self, dir: Direction, n: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx * n,
            y: self.y + dy * n,
        }
    }
}

/// A fixed-size rectangle of tiles, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// A grid with every cell empty.
    pub fn new_empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    /// The tile at `pos`, or `None` when out of bounds.
    pub fn get(&self, pos: Position) -> Option<Tile> {
        self.index(pos).map(|i| self.tiles[i])
    }

    /// Overwrites the tile at `pos`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Position, tile: Tile) {
        if let Some(i) = self.index(pos) {
            self.tiles[i] = tile;
        }
    }

    /// Number of cells holding `tile`.
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }

    /// Whether `pos` lies inside one of the four 2×2 spawn corners.
    pub fn is_spawn_corner(&self, pos: Position) -> bool {
        let (w, h) = (self.width as i32, self.height as i32);
        let near_x = pos.x < 2 || pos.x >= w - 2;
        let near_y = pos.y < 2 || pos.y >= h - 2;
        self.in_bounds(pos) && near_x && near_y
    }

    /// The four spawn cells in join order: top-left, top-right,
    /// bottom-left, bottom-right.
    pub fn spawn_points(&self) -> [Position; 4] {
        let (w, h) = (self.width as i32, self.height as i32);
        [
            Position::new(0, 0),
            Position::new(w - 1, 0),
            Position::new(0, h - 1),
            Position::new(w - 1, h - 1),
        ]
    }
}

/// Generates a fresh map.
///
/// Spawn corners are always empty. Every other odd/odd cell is a wall
/// pillar, and the remaining cells are blocks with probability
/// `block_density`.
pub fn generate<R: Rng>(
    width: usize,
    height: usize,
    block_density: f64,
    rng: &mut R,
) -> Result<TileGrid, GridError> {
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(GridError::InvalidDimensions { width, height });
    }

    let density = block_density.clamp(0.0, 1.0);
    let mut grid = TileGrid::new_empty(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let pos = Position::new(x, y);
            let tile = if grid.is_spawn_corner(pos) {
                Tile::Empty
            } else if x % 2 == 1 && y % 2 == 1 {
                Tile::Wall
            } else if rng.random_bool(density) {
                Tile::Block
            } else {
                Tile::Empty
            };
            grid.set(pos, tile);
        }
    }

    tracing::debug!(
        width,
        height,
        blocks = grid.count(Tile::Block),
        walls = grid.count(Tile::Wall),
        "map generated"
    );
    Ok(grid)
}
