//! Test clients for driving a `RoomDirectory` without any sockets.

#![allow(dead_code)]

use std::time::Duration;

use blastgrid_protocol::{ClientMessage, Codec, JsonCodec};
use blastgrid_room::{Frame, OUTBOUND_QUEUE_CAPACITY, RoomDirectory, ServerMessage};
use blastgrid_transport::ConnectionId;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// A registered connection and the receiving end of its outbound queue.
pub struct Client {
    pub conn: ConnectionId,
    rx: mpsc::Receiver<Frame>,
}

impl Client {
    /// Next message, failing the test if none arrives within two
    /// minutes of (paused) time.
    pub async fn next(&mut self) -> ServerMessage {
        let frame = timeout(Duration::from_secs(120), self.rx.recv())
            .await
            .expect("timed out waiting for a message")
            .expect("outbound queue closed");
        JsonCodec.decode(&frame).expect("server sent undecodable frame")
    }

    /// Next message within `within`, or `None`.
    pub async fn next_within(&mut self, within: Duration) -> Option<ServerMessage> {
        let frame = timeout(within, self.rx.recv()).await.ok()??;
        Some(JsonCodec.decode(&frame).expect("server sent undecodable frame"))
    }

    /// Skips messages until one matches `pred`.
    pub async fn until(&mut self, pred: impl Fn(&ServerMessage) -> bool) -> ServerMessage {
        loop {
            let msg = self.next().await;
            if pred(&msg) {
                return msg;
            }
        }
    }

    /// Drains whatever is already queued.
    pub fn clear(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

pub fn connect(dir: &mut RoomDirectory, id: u64) -> Client {
    let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
    let conn = ConnectionId::new(id);
    dir.register(conn, tx);
    Client { conn, rx }
}

pub async fn join(dir: &mut RoomDirectory, client: &Client, nickname: &str) {
    dir.dispatch(
        client.conn,
        ClientMessage::JoinGame {
            nickname: nickname.to_owned(),
        },
    )
    .await;
}

pub fn is_start(msg: &ServerMessage) -> bool {
    matches!(msg, ServerMessage::StartGame { .. })
}

pub fn is_game_over(msg: &ServerMessage) -> bool {
    matches!(msg, ServerMessage::GameOver { .. })
}
