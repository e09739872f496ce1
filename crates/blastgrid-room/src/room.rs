//! Room actor: an isolated Tokio task that owns one lobby and its match.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. The actor's `select!` loop is the only place
//! room state changes: commands, the lobby timer, the countdown and the
//! tick scheduler are all awaited there.

use blastgrid_protocol::{ClientMessage, PlayerId, RoomId};
use blastgrid_sim::{SimError, Simulation};
use blastgrid_tick::{Deadline, Periodic, TickConfig, TickInfo, TickScheduler};
use blastgrid_transport::ConnectionId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::{ConnectionSender, Gateway, LobbyPlayer, RoomConfig, RoomError, RoomStatus, ServerMessage};

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in some variants is a reply channel: the caller
/// sends a command and waits for the response on it.
pub(crate) enum RoomCommand {
    /// Seat a connection in the lobby.
    Join {
        conn: ConnectionId,
        nickname: String,
        sender: ConnectionSender,
        reply: oneshot::Sender<Result<PlayerId, RoomError>>,
    },

    /// Remove a connection. Replies with the remaining roster size.
    Leave {
        conn: ConnectionId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    /// Deliver a client message.
    Message { conn: ConnectionId, msg: ClientMessage },

    GetInfo { reply: oneshot::Sender<RoomInfo> },

    Shutdown,
}

/// A snapshot of room metadata (not the game state itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub status: RoomStatus,
    /// Connections currently on the roster.
    pub player_count: usize,
    pub max_players: usize,
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Seats a connection and returns the player id it was given.
    pub async fn join(
        &self,
        conn: ConnectionId,
        nickname: String,
        sender: ConnectionSender,
    ) -> Result<PlayerId, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                conn,
                nickname,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    /// Removes a connection and returns how many remain.
    pub async fn leave(&self, conn: ConnectionId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                conn,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    /// Forwards a client message (fire-and-forget).
    pub async fn send_message(&self, conn: ConnectionId, msg: ClientMessage) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Message { conn, msg })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Tells the room to stop. Dropping the actor drops its timers.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

struct Member {
    conn: ConnectionId,
    player_id: PlayerId,
    nickname: String,
    sender: ConnectionSender,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    status: RoomStatus,
    config: RoomConfig,
    gateway: Gateway,
    /// Join order.
    members: Vec<Member>,
    next_player_id: u64,
    countdown: u32,
    lobby_timer: Deadline,
    countdown_timer: Periodic,
    scheduler: TickScheduler,
    sim: Option<Simulation>,
    /// Members whose outbound queue failed during a broadcast. Their
    /// leaves run once the current state transition has finished.
    departed: Vec<ConnectionId>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        info!(room_id = %self.room_id, "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(RoomCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },
                () = self.lobby_timer.fired() => self.on_lobby_timeout(),
                () = self.countdown_timer.fired() => self.on_countdown_step(),
                tick = self.scheduler.wait_for_tick() => {
                    self.on_tick(tick);
                    self.scheduler.record_tick_end();
                }
            }
            self.drop_departed();
        }

        info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                conn,
                nickname,
                sender,
                reply,
            } => {
                let result = self.handle_join(conn, nickname, sender);
                let _ = reply.send(result);
            }
            RoomCommand::Leave { conn, reply } => {
                let result = self.handle_leave(conn);
                self.drop_departed();
                let _ = reply.send(result.map(|()| self.members.len()));
            }
            RoomCommand::Message { conn, msg } => self.handle_message(conn, msg),
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::Shutdown => {}
        }
    }

    // -----------------------------------------------------------------------
    // Lobby
    // -----------------------------------------------------------------------

    fn handle_join(
        &mut self,
        conn: ConnectionId,
        nickname: String,
        sender: ConnectionSender,
    ) -> Result<PlayerId, RoomError> {
        if !self.status.is_joinable() {
            return Err(RoomError::InvalidState(format!(
                "room {} is {}",
                self.room_id, self.status
            )));
        }
        if self.members.iter().any(|m| m.conn == conn) {
            return Err(RoomError::AlreadyInRoom(conn, self.room_id));
        }
        if self.members.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.room_id));
        }

        let player_id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        self.members.push(Member {
            conn,
            player_id,
            nickname,
            sender,
        });
        info!(
            room_id = %self.room_id,
            %conn,
            %player_id,
            players = self.members.len(),
            "player joined"
        );

        if self.members.len() >= self.config.max_players {
            self.enter_countdown();
        } else {
            if self.members.len() >= self.config.min_players && !self.lobby_timer.is_armed() {
                self.lobby_timer.arm(self.config.lobby_wait);
                debug!(room_id = %self.room_id, wait = ?self.config.lobby_wait, "lobby timer armed");
            }
            self.broadcast_lobby();
        }
        Ok(player_id)
    }

    fn handle_leave(&mut self, conn: ConnectionId) -> Result<(), RoomError> {
        let idx = self
            .members
            .iter()
            .position(|m| m.conn == conn)
            .ok_or(RoomError::NotInRoom(conn, self.room_id))?;
        let member = self.members.remove(idx);
        info!(
            room_id = %self.room_id,
            %conn,
            player_id = %member.player_id,
            players = self.members.len(),
            "player left"
        );

        match self.status {
            RoomStatus::Waiting => {
                if self.members.len() < self.config.min_players {
                    self.lobby_timer.cancel();
                }
                self.broadcast_lobby();
            }
            RoomStatus::Countdown => {
                self.countdown_timer.cancel();
                self.status = RoomStatus::Waiting;
                if self.members.len() >= self.config.min_players {
                    self.lobby_timer.arm(self.config.lobby_wait);
                }
                info!(room_id = %self.room_id, "countdown aborted");
                self.broadcast_lobby();
            }
            RoomStatus::InProgress => {
                if let Some(sim) = self.sim.as_mut() {
                    if let Err(err) = sim.disconnect(member.player_id) {
                        debug!(room_id = %self.room_id, %err, "disconnect for unknown player");
                    }
                }
            }
            RoomStatus::Terminated => {}
        }
        Ok(())
    }

    fn on_lobby_timeout(&mut self) {
        if self.status == RoomStatus::Waiting && self.members.len() >= self.config.min_players {
            self.enter_countdown();
        }
    }

    /// Starts the countdown. No-op if it is already running.
    fn enter_countdown(&mut self) {
        if self.status == RoomStatus::Countdown {
            return;
        }
        self.lobby_timer.cancel();
        self.status = RoomStatus::Countdown;
        self.countdown = self.config.countdown_from;
        info!(
            room_id = %self.room_id,
            from = self.countdown,
            players = self.members.len(),
            "countdown started"
        );
        self.broadcast_lobby();
        self.drop_departed();
        if self.status != RoomStatus::Countdown {
            return;
        }

        if self.countdown == 0 {
            self.start_match();
        } else {
            self.countdown_timer.start();
        }
    }

    fn on_countdown_step(&mut self) {
        if self.status != RoomStatus::Countdown {
            self.countdown_timer.cancel();
            return;
        }
        self.countdown = self.countdown.saturating_sub(1);
        self.broadcast(&ServerMessage::UpdateCountdown {
            remaining: self.countdown,
        });
        self.drop_departed();
        if self.status != RoomStatus::Countdown {
            return;
        }
        if self.countdown == 0 {
            self.countdown_timer.cancel();
            self.start_match();
        }
    }

    // -----------------------------------------------------------------------
    // Match
    // -----------------------------------------------------------------------

    fn start_match(&mut self) {
        let roster: Vec<(PlayerId, String)> = self
            .members
            .iter()
            .map(|m| (m.player_id, m.nickname.clone()))
            .collect();
        let rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        match Simulation::new(self.config.sim.clone(), &roster, rng) {
            Ok(sim) => {
                let snapshot = sim.snapshot();
                self.sim = Some(sim);
                self.status = RoomStatus::InProgress;
                self.scheduler.start();
                info!(room_id = %self.room_id, players = roster.len(), "match started");
                self.broadcast(&ServerMessage::StartGame { snapshot });
            }
            Err(err) => self.abort_match(err),
        }
    }

    fn abort_match(&mut self, err: SimError) {
        error!(room_id = %self.room_id, %err, "failed to start match");
        self.status = RoomStatus::Terminated;
        self.broadcast(&ServerMessage::Error {
            reason: format!("match could not start: {err}"),
        });
    }

    fn on_tick(&mut self, tick: TickInfo) {
        let Some(sim) = self.sim.as_mut() else {
            self.scheduler.stop();
            return;
        };

        sim.step(tick.dt);
        let changes = sim.drain_changes();
        let alive: Vec<LobbyPlayer> = sim
            .alive_players()
            .map(|p| LobbyPlayer {
                id: p.id,
                nickname: p.nickname.clone(),
            })
            .collect();

        if !changes.is_empty() {
            self.broadcast(&ServerMessage::GameStateDiff { changes });
        }
        if alive.len() <= 1 {
            self.finish_match(alive.into_iter().next(), tick.tick);
        }
    }

    fn finish_match(&mut self, winner: Option<LobbyPlayer>, tick: u64) {
        self.scheduler.stop();
        self.sim = None;
        self.status = RoomStatus::Terminated;
        match &winner {
            Some(w) => info!(room_id = %self.room_id, tick, winner = %w.id, "match over"),
            None => info!(room_id = %self.room_id, tick, "match over, draw"),
        }
        self.broadcast(&ServerMessage::GameOver { winner });
    }

    // -----------------------------------------------------------------------
    // Messages
    // -----------------------------------------------------------------------

    fn handle_message(&mut self, conn: ConnectionId, msg: ClientMessage) {
        let Some(member) = self.members.iter().find(|m| m.conn == conn) else {
            debug!(room_id = %self.room_id, %conn, "message from non-member, ignoring");
            return;
        };
        let player_id = member.player_id;

        match msg {
            ClientMessage::SendChatMessage { message } => {
                let nickname = member.nickname.clone();
                self.broadcast(&ServerMessage::NewChatMessage { nickname, message });
            }
            ClientMessage::JoinGame { .. } => {
                debug!(room_id = %self.room_id, %conn, "join inside a room, ignoring");
            }
            input => {
                let Some(sim) = self.sim.as_mut() else {
                    debug!(
                        room_id = %self.room_id,
                        %player_id,
                        kind = input.kind(),
                        status = %self.status,
                        "game input outside a match, ignoring"
                    );
                    return;
                };
                let result = match input {
                    ClientMessage::StartMoving { direction } => sim.start_moving(player_id, direction),
                    ClientMessage::StopMoving { direction } => sim.stop_moving(player_id, direction),
                    ClientMessage::PlaceBomb => sim.place_bomb(player_id),
                    _ => Ok(()),
                };
                if let Err(err) = result {
                    debug!(room_id = %self.room_id, %player_id, %err, "game input rejected");
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Broadcasting
    // -----------------------------------------------------------------------

    fn lobby_state(&self) -> ServerMessage {
        ServerMessage::UpdateLobbyState {
            status: self.status,
            players: self
                .members
                .iter()
                .map(|m| LobbyPlayer {
                    id: m.player_id,
                    nickname: m.nickname.clone(),
                })
                .collect(),
            countdown: (self.status == RoomStatus::Countdown).then_some(self.countdown),
        }
    }

    fn broadcast_lobby(&mut self) {
        let msg = self.lobby_state();
        self.broadcast(&msg);
    }

    /// Sends to the whole roster. Connections whose queue is closed or
    /// full are queued for [`drop_departed`](Self::drop_departed).
    fn broadcast(&mut self, msg: &ServerMessage) {
        let closed = self
            .gateway
            .broadcast(msg, self.members.iter().map(|m| (m.conn, &m.sender)));
        for conn in closed {
            debug!(room_id = %self.room_id, %conn, "outbound queue unusable, dropping member");
            self.departed.push(conn);
        }
    }

    /// Runs the leaves collected by [`broadcast`](Self::broadcast). A
    /// leave may broadcast again and add more.
    fn drop_departed(&mut self) {
        while let Some(conn) = self.departed.pop() {
            let _ = self.handle_leave(conn);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id,
            status: self.status,
            player_count: self.members.len(),
            max_players: self.config.max_players,
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: RoomConfig,
    gateway: Gateway,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room_id,
        status: RoomStatus::Waiting,
        scheduler: TickScheduler::new(TickConfig::with_rate(config.tick_rate)),
        countdown_timer: Periodic::new(config.countdown_interval),
        lobby_timer: Deadline::new(),
        countdown: 0,
        config,
        gateway,
        members: Vec::new(),
        departed: Vec::new(),
        next_player_id: 1,
        sim: None,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
