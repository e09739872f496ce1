//! The match simulation.
//!
//! [`Simulation`] is advanced by the room once per tick with a fixed
//! `dt`. It never looks at the clock and all randomness comes from the
//! RNG it was built with, so a seeded match replays identically.

use std::time::Duration;

use blastgrid_protocol::{Direction, PlayerId};
use rand::Rng;
use rand::rngs::StdRng;

use crate::change::{BombView, Change, ChangeLog, PlayerView, PowerUp, PowerUpKind, Snapshot};
use crate::grid::{self, Position, Tile, TileGrid};
use crate::player::{Motion, Player};
use crate::{SimConfig, SimError};

#[derive(Debug, Clone)]
struct Bomb {
    id: u64,
    owner: PlayerId,
    cell: Position,
    /// Seconds until detonation.
    fuse: f32,
}

impl Bomb {
    fn view(&self) -> BombView {
        BombView {
            id: self.id,
            owner: self.owner,
            x: self.cell.x,
            y: self.cell.y,
        }
    }
}

#[derive(Debug, Clone)]
struct Explosion {
    cell: Position,
    remaining: f32,
}

/// Authoritative state of one running match.
pub struct Simulation {
    config: SimConfig,
    grid: TileGrid,
    /// Join order.
    players: Vec<Player>,
    /// Placement order.
    bombs: Vec<Bomb>,
    explosions: Vec<Explosion>,
    power_ups: Vec<PowerUp>,
    next_bomb_id: u64,
    changes: ChangeLog,
    rng: StdRng,
    initial_blocks: usize,
    destroyed_blocks: usize,
}

impl Simulation {
    /// Generates a map and spawns `roster` on it in join order.
    pub fn new(
        config: SimConfig,
        roster: &[(PlayerId, String)],
        mut rng: StdRng,
    ) -> Result<Self, SimError> {
        let grid = grid::generate(config.width, config.height, config.block_density, &mut rng)?;
        Ok(Self::with_grid(config, grid, roster, rng))
    }

    /// Spawns `roster` on an existing map.
    ///
    /// Players take the spawn corners in join order; a fifth player
    /// would share the first corner.
    pub fn with_grid(
        config: SimConfig,
        grid: TileGrid,
        roster: &[(PlayerId, String)],
        rng: StdRng,
    ) -> Self {
        let spawns = grid.spawn_points();
        let players = roster
            .iter()
            .enumerate()
            .map(|(i, (id, nickname))| {
                Player::spawn(*id, nickname.clone(), spawns[i % spawns.len()], &config)
            })
            .collect();
        let initial_blocks = grid.count(Tile::Block);

        Self {
            config,
            grid,
            players,
            bombs: Vec::new(),
            explosions: Vec::new(),
            power_ups: Vec::new(),
            next_bomb_id: 1,
            changes: ChangeLog::default(),
            rng,
            initial_blocks,
            destroyed_blocks: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    fn player_index(&self, id: PlayerId) -> Result<usize, SimError> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(SimError::UnknownPlayer(id))
    }

    /// Marks `dir` as held. Takes effect at the next position update.
    pub fn start_moving(&mut self, id: PlayerId, dir: Direction) -> Result<(), SimError> {
        let idx = self.player_index(id)?;
        self.players[idx].intent.press(dir);
        Ok(())
    }

    pub fn stop_moving(&mut self, id: PlayerId, dir: Direction) -> Result<(), SimError> {
        let idx = self.player_index(id)?;
        self.players[idx].intent.release(dir);
        Ok(())
    }

    /// Drops a bomb on the player's cell.
    ///
    /// Does nothing if the player is dead, has no bomb available, or a
    /// bomb already sits on that cell.
    pub fn place_bomb(&mut self, id: PlayerId) -> Result<(), SimError> {
        let idx = self.player_index(id)?;
        let player = &mut self.players[idx];
        if !player.alive || player.bombs == 0 || self.bombs.iter().any(|b| b.cell == player.cell) {
            return Ok(());
        }

        player.bombs -= 1;
        let bomb = Bomb {
            id: self.next_bomb_id,
            owner: id,
            cell: player.cell,
            fuse: self.config.bomb_fuse,
        };
        self.next_bomb_id += 1;
        self.changes.push(Change::BombPlaced(bomb.view()));
        self.bombs.push(bomb);
        Ok(())
    }

    /// Marks a player as gone. The entity stays in the match.
    pub fn disconnect(&mut self, id: PlayerId) -> Result<(), SimError> {
        let idx = self.player_index(id)?;
        let player = &mut self.players[idx];
        if player.alive {
            player.alive = false;
            player.intent.clear();
            self.changes.push(Change::PlayerDied { id });
            tracing::debug!(player_id = %id, "player disconnected mid-match");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    /// Advances one player along their current intent.
    pub fn update_position(&mut self, id: PlayerId, dt: Duration) -> Result<(), SimError> {
        let idx = self.player_index(id)?;
        self.move_player(idx, dt);
        Ok(())
    }

    fn is_walkable(&self, pos: Position) -> bool {
        self.grid.get(pos).is_some_and(Tile::is_passable)
            && !self.bombs.iter().any(|b| b.cell == pos)
    }

    fn move_player(&mut self, idx: usize, dt: Duration) {
        let player = &self.players[idx];
        if !player.alive {
            return;
        }
        let Motion::Moving(dir) = player.intent.motion() else {
            return;
        };

        // Never cover more than a cell per update, so a long dt can't
        // tunnel through a wall.
        let distance = (self.config.base_speed * player.speed * dt.as_secs_f32()).min(1.0);
        let (dx, dy) = dir.delta();
        let (cx, cy) = player.continuous;
        let candidate = if dir.is_horizontal() {
            (cx + dx as f32 * distance, player.cell.y as f32)
        } else {
            (player.cell.x as f32, cy + dy as f32 * distance)
        };
        let target = Position::new(candidate.0.round() as i32, candidate.1.round() as i32);

        if target == player.cell {
            self.players[idx].continuous = candidate;
            return;
        }
        if !self.is_walkable(target) {
            self.players[idx].snap_to_cell();
            return;
        }

        let player = &mut self.players[idx];
        player.cell = target;
        player.continuous = candidate;
        let id = player.id;
        self.changes.push(Change::PlayerMoved {
            id,
            x: target.x,
            y: target.y,
        });
        self.collect_power_up(idx);
    }

    fn collect_power_up(&mut self, idx: usize) {
        let player = &mut self.players[idx];
        let Some(slot) = self.power_ups.iter().position(|p| p.position() == player.cell) else {
            return;
        };
        let power_up = self.power_ups.remove(slot);

        match power_up.kind {
            PowerUpKind::ExtraBomb => player.bombs += 1,
            PowerUpKind::ExtraFlame => player.flame += 1,
            PowerUpKind::ExtraSpeed => {
                player.speed = (player.speed + self.config.speed_step).min(self.config.max_speed);
            }
        }

        self.changes.push(Change::PowerUpCollected {
            id: player.id,
            x: power_up.x,
            y: power_up.y,
            kind: power_up.kind,
        });
        self.changes.push(Change::PlayerStatsChanged {
            id: player.id,
            bombs: player.bombs,
            flame: player.flame,
            speed: player.speed,
        });
    }

    // -----------------------------------------------------------------------
    // Timers and explosions
    // -----------------------------------------------------------------------

    /// Moves every player in join order, then advances timers.
    pub fn step(&mut self, dt: Duration) {
        for idx in 0..self.players.len() {
            self.move_player(idx, dt);
        }
        self.tick(dt);
    }

    /// Burns fuses, detonates due bombs and expires old explosion cells.
    pub fn tick(&mut self, dt: Duration) {
        let dt = dt.as_secs_f32();
        for bomb in &mut self.bombs {
            bomb.fuse -= dt;
        }

        // Cells ignited below are not aged until the next tick.
        let aged = self.explosions.len();

        // Chained bombs get a zero fuse and are picked up by a later
        // iteration of this loop.
        while let Some(i) = self.bombs.iter().position(|b| b.fuse <= 0.0) {
            let bomb = self.bombs.remove(i);
            self.detonate(bomb);
        }

        let before = self.explosions.len();
        for explosion in &mut self.explosions[..aged] {
            explosion.remaining -= dt;
        }
        self.explosions.retain(|e| e.remaining > 0.0);
        if self.explosions.len() != before {
            self.changes.push(Change::ExplosionsCleared {
                explosions: self.explosions.iter().map(|e| e.cell).collect(),
            });
        }
    }

    fn detonate(&mut self, bomb: Bomb) {
        self.changes.push(Change::BombExploded {
            id: bomb.id,
            owner: bomb.owner,
            x: bomb.cell.x,
            y: bomb.cell.y,
        });

        let mut reach = self.config.starting_flame;
        if let Some(owner) = self.players.iter_mut().find(|p| p.id == bomb.owner) {
            owner.bombs += 1;
            reach = owner.flame;
        }

        let mut ignited = vec![bomb.cell];
        self.ignite(bomb.cell);
        for dir in Direction::ALL {
            for n in 1..=reach as i32 {
                let pos = bomb.cell.step(dir, n);
                match self.grid.get(pos) {
                    None | Some(Tile::Wall) => break,
                    Some(Tile::Block) => {
                        ignited.push(pos);
                        self.ignite(pos);
                        self.destroy_block(pos);
                        break;
                    }
                    Some(Tile::Empty) => {
                        ignited.push(pos);
                        self.ignite(pos);
                    }
                }
            }
        }

        for player in self
            .players
            .iter_mut()
            .filter(|p| p.alive && ignited.contains(&p.cell))
        {
            player.lives = player.lives.saturating_sub(1);
            self.changes.push(Change::PlayerDamaged {
                id: player.id,
                lives: player.lives,
            });
            if player.lives == 0 {
                player.alive = false;
                player.intent.clear();
                self.changes.push(Change::PlayerDied { id: player.id });
                tracing::debug!(player_id = %player.id, "player eliminated");
            }
        }
    }

    fn ignite(&mut self, cell: Position) {
        self.explosions.push(Explosion {
            cell,
            remaining: self.config.explosion_duration,
        });
        self.changes.push(Change::ExplosionStarted(cell));
        for bomb in self.bombs.iter_mut().filter(|b| b.cell == cell) {
            bomb.fuse = 0.0;
        }
    }

    fn destroy_block(&mut self, pos: Position) {
        self.grid.set(pos, Tile::Empty);
        self.destroyed_blocks += 1;
        self.changes.push(Change::BlockDestroyed(pos));

        if self.rng.random_bool(self.config.powerup_chance.clamp(0.0, 1.0)) {
            let kind = PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())];
            let power_up = PowerUp {
                x: pos.x,
                y: pos.y,
                kind,
            };
            self.power_ups.push(power_up);
            self.changes.push(Change::PowerUpSpawned(power_up));
        }
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Takes this tick's changes.
    pub fn drain_changes(&mut self) -> Vec<Change> {
        self.changes.drain()
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            map: self.grid.clone(),
            players: self
                .players
                .iter()
                .map(|p| PlayerView {
                    id: p.id,
                    nickname: p.nickname.clone(),
                    x: p.cell.x,
                    y: p.cell.y,
                    alive: p.alive,
                    lives: p.lives,
                    bombs: p.bombs,
                    flame: p.flame,
                    speed: p.speed,
                })
                .collect(),
            bombs: self.bombs.iter().map(Bomb::view).collect(),
            explosions: self.explosions.iter().map(|e| e.cell).collect(),
            power_ups: self.power_ups.clone(),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Blocks on the map when the match started.
    pub fn initial_blocks(&self) -> usize {
        self.initial_blocks
    }

    pub fn destroyed_blocks(&self) -> usize {
        self.destroyed_blocks
    }
}
