//! Room directory: matchmaking and routing from connections to rooms.

use std::collections::{BTreeMap, HashMap};

use blastgrid_protocol::{ClientMessage, RoomId};
use blastgrid_transport::ConnectionId;

use crate::room::spawn_room;
use crate::{ConnectionSender, Gateway, RoomConfig, RoomError, RoomHandle, RoomInfo, RoomStatus, ServerMessage};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

struct Binding {
    sender: ConnectionSender,
    room: Option<RoomId>,
}

/// Tracks every live room and which room each connection sits in.
///
/// A connection is in at most one room at a time. The server keeps the
/// directory behind a single mutex; rooms themselves run independently.
pub struct RoomDirectory {
    config: RoomConfig,
    gateway: Gateway,
    /// Keyed by id, which is also creation order.
    rooms: BTreeMap<RoomId, RoomHandle>,
    connections: HashMap<ConnectionId, Binding>,
    next_room_id: u64,
}

impl RoomDirectory {
    pub fn new(config: RoomConfig) -> Self {
        Self::with_gateway(config, Gateway::default())
    }

    pub fn with_gateway(config: RoomConfig, gateway: Gateway) -> Self {
        Self {
            config,
            gateway,
            rooms: BTreeMap::new(),
            connections: HashMap::new(),
            next_room_id: 1,
        }
    }

    /// Starts tracking a connection's outbound queue.
    pub fn register(&mut self, conn: ConnectionId, sender: ConnectionSender) {
        self.connections.insert(conn, Binding { sender, room: None });
        tracing::debug!(%conn, "connection registered");
    }

    /// Routes one inbound message.
    ///
    /// Joins are matched to a room here; everything else goes to the
    /// connection's room or is dropped if it has none. Refusals are sent
    /// back to the requesting connection only.
    pub async fn dispatch(&mut self, conn: ConnectionId, msg: ClientMessage) {
        match msg {
            ClientMessage::JoinGame { nickname } => {
                if let Err(err) = self.join(conn, nickname).await {
                    tracing::debug!(%conn, %err, "join refused");
                    self.send_error(conn, &err);
                }
            }
            other => {
                let Some(room_id) = self.room_of(conn) else {
                    tracing::debug!(%conn, kind = other.kind(), "message from unbound connection, dropping");
                    return;
                };
                let Some(handle) = self.rooms.get(&room_id) else {
                    return;
                };
                if let Err(err) = handle.send_message(conn, other).await {
                    tracing::debug!(%conn, %room_id, %err, "failed to forward message");
                }
            }
        }
    }

    async fn join(&mut self, conn: ConnectionId, nickname: String) -> Result<RoomId, RoomError> {
        let binding = self
            .connections
            .get(&conn)
            .ok_or_else(|| RoomError::InvalidState(format!("connection {conn} is not registered")))?;
        let sender = binding.sender.clone();

        if let Some(current) = binding.room {
            let status = match self.rooms.get(&current) {
                Some(handle) => handle.get_info().await.ok().map(|info| info.status),
                None => None,
            };
            if status.is_some_and(|s| s != RoomStatus::Terminated) {
                return Err(RoomError::AlreadyInRoom(conn, current));
            }
            // Finished match: leave it and get matched again.
            self.leave(conn, current).await;
        }

        let room_id = self.find_or_create_room().await;
        let result = match self.rooms.get(&room_id) {
            Some(handle) => handle.join(conn, nickname.clone(), sender.clone()).await,
            None => Err(RoomError::NotFound(room_id)),
        };
        let room_id = match result {
            Ok(_) => room_id,
            // The room moved on between the scan and the join.
            Err(RoomError::RoomFull(_) | RoomError::InvalidState(_)) => {
                let fresh = self.create_room();
                let handle = self.rooms.get(&fresh).ok_or(RoomError::NotFound(fresh))?;
                handle.join(conn, nickname, sender).await?;
                fresh
            }
            Err(err) => return Err(err),
        };

        if let Some(binding) = self.connections.get_mut(&conn) {
            binding.room = Some(room_id);
        }
        Ok(room_id)
    }

    /// Returns the first waiting room with a free seat, in creation
    /// order, or creates a new one.
    pub async fn find_or_create_room(&mut self) -> RoomId {
        for handle in self.rooms.values() {
            if let Ok(info) = handle.get_info().await {
                if info.status.is_joinable() && info.player_count < info.max_players {
                    return info.room_id;
                }
            }
        }
        self.create_room()
    }

    fn create_room(&mut self) -> RoomId {
        let room_id = RoomId(self.next_room_id);
        self.next_room_id += 1;
        let handle = spawn_room(
            room_id,
            self.config.clone(),
            self.gateway.clone(),
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(room_id, handle);
        tracing::info!(%room_id, "room created");
        room_id
    }

    /// Forgets a connection and removes it from its room, destroying
    /// the room if that left it empty.
    pub async fn close(&mut self, conn: ConnectionId) {
        let Some(binding) = self.connections.remove(&conn) else {
            return;
        };
        tracing::debug!(%conn, "connection closed");
        if let Some(room_id) = binding.room {
            self.leave(conn, room_id).await;
        }
    }

    async fn leave(&mut self, conn: ConnectionId, room_id: RoomId) {
        if let Some(binding) = self.connections.get_mut(&conn) {
            binding.room = None;
        }
        let Some(handle) = self.rooms.get(&room_id) else {
            return;
        };

        let remaining = match handle.leave(conn).await {
            Ok(remaining) => remaining,
            // Already dropped by the room (e.g. its queue closed first).
            Err(RoomError::NotInRoom(..)) => match handle.get_info().await {
                Ok(info) => info.player_count,
                Err(_) => 0,
            },
            Err(_) => 0,
        };
        if remaining == 0 {
            self.destroy_room(room_id).await;
        }
    }

    async fn destroy_room(&mut self, room_id: RoomId) {
        if let Some(handle) = self.rooms.remove(&room_id) {
            let _ = handle.shutdown().await;
            for binding in self.connections.values_mut() {
                if binding.room == Some(room_id) {
                    binding.room = None;
                }
            }
            tracing::info!(%room_id, "room destroyed");
        }
    }

    fn send_error(&self, conn: ConnectionId, err: &RoomError) {
        if let Some(binding) = self.connections.get(&conn) {
            self.gateway.send(
                &binding.sender,
                &ServerMessage::Error {
                    reason: err.to_string(),
                },
            );
        }
    }

    /// The room a connection currently sits in.
    pub fn room_of(&self, conn: ConnectionId) -> Option<RoomId> {
        self.connections.get(&conn).and_then(|b| b.room)
    }

    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self.rooms.get(&room_id).ok_or(RoomError::NotFound(room_id))?;
        handle.get_info().await
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }
}
