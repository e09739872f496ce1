//! Per-connection handler: outbound writer, inbound decoding and routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbound queue with the room directory
//!   2. Spawn a writer task that drains the queue onto the socket
//!   3. Loop: receive frames → decode → dispatch to the directory

use std::sync::Arc;

use blastgrid_protocol::{ClientMessage, Codec};
use blastgrid_room::{Frame, OUTBOUND_QUEUE_CAPACITY};
use blastgrid_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::BlastgridError;
use crate::server::ServerState;

/// Drop guard that removes the connection from the directory when the
/// handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async lock.
struct ConnectionGuard {
    conn_id: ConnectionId,
    state: Arc<ServerState>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.directory.lock().await.close(conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), BlastgridError> {
    let conn_id = conn.id();
    let conn = Arc::new(conn);
    tracing::debug!(%conn_id, "handling new connection");

    let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
    state.directory.lock().await.register(conn_id, tx);
    let _guard = ConnectionGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    let writer = tokio::spawn(write_frames(Arc::clone(&conn), rx));

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "malformed frame, dropping");
                continue;
            }
        };

        // PERF: the directory lock is held while the room answers.
        // Rooms reply from their own loop, so this never waits on a tick.
        state.directory.lock().await.dispatch(conn_id, msg).await;
    }

    writer.abort();
    conn.close().await?;
    // _guard drops here → directory close fires.
    Ok(())
}

/// Drains the outbound queue onto the socket until the queue closes or
/// the socket fails.
async fn write_frames(conn: Arc<WebSocketConnection>, mut rx: mpsc::Receiver<Frame>) {
    let conn_id = conn.id();
    while let Some(frame) = rx.recv().await {
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
}
