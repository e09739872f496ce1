//! Outbound messages and the broadcast gateway.

use std::sync::Arc;

use blastgrid_protocol::{Codec, JsonCodec, PlayerId, ProtocolError};
use blastgrid_sim::{Change, Snapshot};
use blastgrid_transport::ConnectionId;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::RoomStatus;

/// One encoded message, shared by every connection it is sent to.
pub type Frame = Arc<[u8]>;

/// Frames a connection may have queued before it counts as gone.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Outbound queue of one connection. Its writer task drains it.
pub type ConnectionSender = mpsc::Sender<Frame>;

/// A roster entry as shown in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyPlayer {
    pub id: PlayerId,
    pub nickname: String,
}

/// Messages the server sends to clients.
///
/// Same adjacently tagged shape as the inbound messages:
///
/// ```text
/// { "type": "UPDATE_COUNTDOWN", "payload": { "remaining": 7 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// A request from this connection was refused.
    Error { reason: String },

    UpdateLobbyState {
        status: RoomStatus,
        players: Vec<LobbyPlayer>,
        /// Countdown value while in countdown, `null` otherwise.
        countdown: Option<u32>,
    },

    UpdateCountdown { remaining: u32 },

    /// The match began; `snapshot` is the full initial state.
    StartGame { snapshot: Snapshot },

    /// Everything that changed during one tick, in order.
    GameStateDiff { changes: Vec<Change> },

    /// `winner` is `null` on a draw.
    GameOver { winner: Option<LobbyPlayer> },

    NewChatMessage { nickname: String, message: String },
}

impl ServerMessage {
    /// The wire name of this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Error { .. } => "ERROR",
            Self::UpdateLobbyState { .. } => "UPDATE_LOBBY_STATE",
            Self::UpdateCountdown { .. } => "UPDATE_COUNTDOWN",
            Self::StartGame { .. } => "START_GAME",
            Self::GameStateDiff { .. } => "GAME_STATE_DIFF",
            Self::GameOver { .. } => "GAME_OVER",
            Self::NewChatMessage { .. } => "NEW_CHAT_MESSAGE",
        }
    }
}

/// Encodes a message once and pushes the frame to many connections.
///
/// Pushes never wait. A connection whose queue is full is reported the
/// same as one whose writer is gone, so a stalled reader is dropped
/// instead of buffering without limit.
#[derive(Debug, Clone, Default)]
pub struct Gateway<C: Codec = JsonCodec> {
    codec: C,
}

impl<C: Codec> Gateway<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn encode(&self, msg: &ServerMessage) -> Result<Frame, ProtocolError> {
        Ok(self.codec.encode(msg)?.into())
    }

    /// Sends `msg` to one connection. Returns `false` if its queue is
    /// closed or full, or encoding failed.
    pub fn send(&self, sender: &ConnectionSender, msg: &ServerMessage) -> bool {
        match self.encode(msg) {
            Ok(frame) => push(sender, frame),
            Err(err) => {
                tracing::error!(kind = msg.kind(), %err, "failed to encode outbound message");
                false
            }
        }
    }

    /// Sends `msg` to every target and returns the connections whose
    /// queues are closed or full.
    pub fn broadcast<'a, I>(&self, msg: &ServerMessage, targets: I) -> Vec<ConnectionId>
    where
        I: IntoIterator<Item = (ConnectionId, &'a ConnectionSender)>,
    {
        let frame = match self.encode(msg) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!(kind = msg.kind(), %err, "failed to encode broadcast");
                return Vec::new();
            }
        };

        targets
            .into_iter()
            .filter(|(_, sender)| !push(sender, Arc::clone(&frame)))
            .map(|(conn, _)| conn)
            .collect()
    }
}

fn push(sender: &ConnectionSender, frame: Frame) -> bool {
    match sender.try_send(frame) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::debug!("outbound queue full, treating connection as closed");
            false
        }
        Err(TrySendError::Closed(_)) => false,
    }
}
