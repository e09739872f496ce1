//! Player entities and their movement intent.

use blastgrid_protocol::{Direction, PlayerId};

use crate::{Position, SimConfig};

/// What a player is currently trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Idle,
    Moving(Direction),
}

/// The set of direction keys a player is holding.
///
/// Each press is stamped with a sequence number so releases can fall
/// back to the most recent key still held. Horizontal keys win over
/// vertical ones; within an axis the newest press wins.
#[derive(Debug, Clone, Default)]
pub struct MoveIntent {
    held: [Option<u64>; 4],
    seq: u64,
}

impl MoveIntent {
    /// Records a key press. Pressing a held key refreshes it.
    pub fn press(&mut self, dir: Direction) {
        self.seq += 1;
        self.held[dir.index()] = Some(self.seq);
    }

    pub fn release(&mut self, dir: Direction) {
        self.held[dir.index()] = None;
    }

    pub fn clear(&mut self) {
        self.held = [None; 4];
    }

    pub fn motion(&self) -> Motion {
        let newest = |horizontal: bool| {
            Direction::ALL
                .into_iter()
                .filter(|d| d.is_horizontal() == horizontal)
                .filter_map(|d| self.held[d.index()].map(|seq| (seq, d)))
                .max_by_key(|(seq, _)| *seq)
                .map(|(_, d)| d)
        };
        match newest(true).or_else(|| newest(false)) {
            Some(dir) => Motion::Moving(dir),
            None => Motion::Idle,
        }
    }
}

/// One player inside a running match.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    /// The cell the player occupies.
    pub cell: Position,
    /// Sub-cell position in cell units; cell centres sit on integers.
    pub(crate) continuous: (f32, f32),
    pub alive: bool,
    pub lives: u32,
    /// Bombs the player may still place right now.
    pub bombs: u32,
    /// Explosion reach in cells.
    pub flame: u32,
    /// Speed multiplier.
    pub speed: f32,
    pub intent: MoveIntent,
}

impl Player {
    pub(crate) fn spawn(id: PlayerId, nickname: String, cell: Position, config: &SimConfig) -> Self {
        Self {
            id,
            nickname,
            cell,
            continuous: (cell.x as f32, cell.y as f32),
            alive: true,
            lives: config.starting_lives,
            bombs: config.starting_bombs,
            flame: config.starting_flame,
            speed: config.starting_speed,
            intent: MoveIntent::default(),
        }
    }

    /// Sub-cell position in cell units.
    pub fn continuous_position(&self) -> (f32, f32) {
        self.continuous
    }

    pub(crate) fn snap_to_cell(&mut self) {
        self.continuous = (self.cell.x as f32, self.cell.y as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_by_default() {
        assert_eq!(MoveIntent::default().motion(), Motion::Idle);
    }

    #[test]
    fn test_horizontal_overrides_vertical() {
        let mut intent = MoveIntent::default();
        intent.press(Direction::Left);
        intent.press(Direction::Up);
        assert_eq!(intent.motion(), Motion::Moving(Direction::Left));

        intent.release(Direction::Left);
        assert_eq!(intent.motion(), Motion::Moving(Direction::Up));
    }

    #[test]
    fn test_newest_wins_within_axis() {
        let mut intent = MoveIntent::default();
        intent.press(Direction::Left);
        intent.press(Direction::Right);
        assert_eq!(intent.motion(), Motion::Moving(Direction::Right));

        intent.release(Direction::Right);
        assert_eq!(intent.motion(), Motion::Moving(Direction::Left));
    }

    #[test]
    fn test_repress_refreshes_recency() {
        let mut intent = MoveIntent::default();
        intent.press(Direction::Up);
        intent.press(Direction::Down);
        intent.press(Direction::Up);
        assert_eq!(intent.motion(), Motion::Moving(Direction::Up));
    }

    #[test]
    fn test_release_unheld_is_noop() {
        let mut intent = MoveIntent::default();
        intent.press(Direction::Down);
        intent.release(Direction::Left);
        assert_eq!(intent.motion(), Motion::Moving(Direction::Down));

        intent.clear();
        assert_eq!(intent.motion(), Motion::Idle);
    }
}
