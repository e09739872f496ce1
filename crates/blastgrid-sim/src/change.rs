//! Change log entries and the snapshot they replay onto.
//!
//! Clients receive one [`Snapshot`] when the match starts and then a
//! list of [`Change`]s per tick. Applying every change in order to the
//! previous snapshot yields exactly the engine's next snapshot.

use blastgrid_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::{Position, TileGrid, grid::Tile};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// What kind of boost a power-up gives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    ExtraBomb,
    ExtraFlame,
    ExtraSpeed,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [Self::ExtraBomb, Self::ExtraFlame, Self::ExtraSpeed];
}

/// A power-up lying on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    pub x: i32,
    pub y: i32,
    pub kind: PowerUpKind,
}

impl PowerUp {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// A bomb as clients see it. The fuse stays server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BombView {
    pub id: u64,
    pub owner: PlayerId,
    pub x: i32,
    pub y: i32,
}

/// A player as clients see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub nickname: String,
    pub x: i32,
    pub y: i32,
    pub alive: bool,
    pub lives: u32,
    pub bombs: u32,
    pub flame: u32,
    pub speed: f32,
}

// ---------------------------------------------------------------------------
// Change
// ---------------------------------------------------------------------------

/// One atomic delta produced by the simulation.
///
/// Serialized like every other wire message:
///
/// ```text
/// { "type": "PLAYER_MOVED", "payload": { "id": 1, "x": 2, "y": 0 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Change {
    PlayerMoved {
        id: PlayerId,
        x: i32,
        y: i32,
    },
    BombPlaced(BombView),
    BombExploded {
        id: u64,
        owner: PlayerId,
        x: i32,
        y: i32,
    },
    ExplosionStarted(Position),
    /// Carries the explosion cells still burning after the removal.
    ExplosionsCleared {
        explosions: Vec<Position>,
    },
    BlockDestroyed(Position),
    #[serde(rename = "POWERUP_SPAWNED")]
    PowerUpSpawned(PowerUp),
    #[serde(rename = "POWERUP_COLLECTED")]
    PowerUpCollected {
        id: PlayerId,
        x: i32,
        y: i32,
        kind: PowerUpKind,
    },
    PlayerStatsChanged {
        id: PlayerId,
        bombs: u32,
        flame: u32,
        speed: f32,
    },
    PlayerDamaged {
        id: PlayerId,
        lives: u32,
    },
    PlayerDied {
        id: PlayerId,
    },
}

/// Ordered changes accumulated since the last drain.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    entries: Vec<Change>,
}

impl ChangeLog {
    pub fn push(&mut self, change: Change) {
        self.entries.push(change);
    }

    /// Takes every pending change, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Full observable state of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub map: TileGrid,
    pub players: Vec<PlayerView>,
    pub bombs: Vec<BombView>,
    pub explosions: Vec<Position>,
    pub power_ups: Vec<PowerUp>,
}

impl Snapshot {
    fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerView> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Applies one change the way a client would.
    ///
    /// Changes naming unknown players or bombs are ignored.
    pub fn apply(&mut self, change: &Change) {
        match change {
            Change::PlayerMoved { id, x, y } => {
                if let Some(p) = self.player_mut(*id) {
                    p.x = *x;
                    p.y = *y;
                }
            }
            Change::BombPlaced(bomb) => {
                self.bombs.push(*bomb);
                if let Some(p) = self.player_mut(bomb.owner) {
                    p.bombs = p.bombs.saturating_sub(1);
                }
            }
            Change::BombExploded { id, owner, .. } => {
                self.bombs.retain(|b| b.id != *id);
                if let Some(p) = self.player_mut(*owner) {
                    p.bombs += 1;
                }
            }
            Change::ExplosionStarted(pos) => self.explosions.push(*pos),
            Change::ExplosionsCleared { explosions } => self.explosions = explosions.clone(),
            Change::BlockDestroyed(pos) => self.map.set(*pos, Tile::Empty),
            Change::PowerUpSpawned(power_up) => self.power_ups.push(*power_up),
            Change::PowerUpCollected { x, y, .. } => {
                self.power_ups.retain(|p| (p.x, p.y) != (*x, *y));
            }
            Change::PlayerStatsChanged {
                id,
                bombs,
                flame,
                speed,
            } => {
                if let Some(p) = self.player_mut(*id) {
                    p.bombs = *bombs;
                    p.flame = *flame;
                    p.speed = *speed;
                }
            }
            Change::PlayerDamaged { id, lives } => {
                if let Some(p) = self.player_mut(*id) {
                    p.lives = *lives;
                }
            }
            Change::PlayerDied { id } => {
                if let Some(p) = self.player_mut(*id) {
                    p.alive = false;
                }
            }
        }
    }

    /// Applies a whole tick's worth of changes in order.
    pub fn apply_all<'a>(&mut self, changes: impl IntoIterator<Item = &'a Change>) {
        for change in changes {
            self.apply(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_snapshot() -> Snapshot {
        Snapshot {
            map: TileGrid::new_empty(5, 5),
            players: vec![PlayerView {
                id: PlayerId(1),
                nickname: "ada".into(),
                x: 0,
                y: 0,
                alive: true,
                lives: 3,
                bombs: 1,
                flame: 1,
                speed: 1.0,
            }],
            bombs: vec![],
            explosions: vec![],
            power_ups: vec![],
        }
    }

    #[test]
    fn test_wire_names() {
        let cases = [
            (Change::PlayerDied { id: PlayerId(1) }, "PLAYER_DIED"),
            (Change::BlockDestroyed(Position::new(1, 2)), "BLOCK_DESTROYED"),
            (
                Change::PowerUpSpawned(PowerUp { x: 1, y: 2, kind: PowerUpKind::ExtraFlame }),
                "POWERUP_SPAWNED",
            ),
            (
                Change::PowerUpCollected {
                    id: PlayerId(1),
                    x: 1,
                    y: 2,
                    kind: PowerUpKind::ExtraBomb,
                },
                "POWERUP_COLLECTED",
            ),
            (Change::ExplosionsCleared { explosions: vec![] }, "EXPLOSIONS_CLEARED"),
        ];
        for (change, name) in cases {
            let json = serde_json::to_value(&change).unwrap();
            assert_eq!(json["type"], name);
        }
    }

    #[test]
    fn test_payload_shapes() {
        let json = serde_json::to_value(Change::BombExploded {
            id: 4,
            owner: PlayerId(2),
            x: 5,
            y: 6,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "BOMB_EXPLODED", "payload": {"id": 4, "owner": 2, "x": 5, "y": 6}})
        );

        let json = serde_json::to_value(Change::PowerUpSpawned(PowerUp {
            x: 3,
            y: 1,
            kind: PowerUpKind::ExtraSpeed,
        }))
        .unwrap();
        assert_eq!(json["payload"]["kind"], "extra_speed");
    }

    #[test]
    fn test_bomb_lifecycle_adjusts_owner_budget() {
        let mut snap = empty_snapshot();
        let bomb = BombView { id: 1, owner: PlayerId(1), x: 0, y: 0 };

        snap.apply(&Change::BombPlaced(bomb));
        assert_eq!(snap.players[0].bombs, 0);
        assert_eq!(snap.bombs, vec![bomb]);

        snap.apply(&Change::BombExploded { id: 1, owner: PlayerId(1), x: 0, y: 0 });
        assert_eq!(snap.players[0].bombs, 1);
        assert!(snap.bombs.is_empty());
    }

    #[test]
    fn test_block_destroyed_clears_tile() {
        let mut snap = empty_snapshot();
        snap.map.set(Position::new(2, 2), Tile::Block);
        snap.apply(&Change::BlockDestroyed(Position::new(2, 2)));
        assert_eq!(snap.map.get(Position::new(2, 2)), Some(Tile::Empty));
    }

    #[test]
    fn test_explosions_cleared_replaces_list() {
        let mut snap = empty_snapshot();
        snap.apply_all(&[
            Change::ExplosionStarted(Position::new(1, 1)),
            Change::ExplosionStarted(Position::new(1, 2)),
            Change::ExplosionsCleared { explosions: vec![Position::new(1, 2)] },
        ]);
        assert_eq!(snap.explosions, vec![Position::new(1, 2)]);
    }

    #[test]
    fn test_unknown_player_is_ignored() {
        let mut snap = empty_snapshot();
        let before = snap.clone();
        snap.apply(&Change::PlayerDamaged { id: PlayerId(9), lives: 0 });
        assert_eq!(snap, before);
    }

    #[test]
    fn test_change_log_drain_empties() {
        let mut log = ChangeLog::default();
        log.push(Change::PlayerDied { id: PlayerId(1) });
        assert_eq!(log.len(), 1);
        assert_eq!(log.iter().count(), 1);
        assert_eq!(log.drain().len(), 1);
        assert!(log.is_empty());
    }
}
