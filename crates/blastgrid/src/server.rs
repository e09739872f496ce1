//! `BlastgridServer` builder and accept loop.
//!
//! This is the entry point for running a Blastgrid server. It ties the
//! layers together: transport → protocol → room directory → rooms.

use std::net::SocketAddr;
use std::sync::Arc;

use blastgrid_protocol::JsonCodec;
use blastgrid_room::{RoomConfig, RoomDirectory};
use blastgrid_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::BlastgridError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Rooms run in their own tasks; the lock only guards matchmaking and
/// routing, never a tick.
pub(crate) struct ServerState {
    pub(crate) directory: Mutex<RoomDirectory>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Blastgrid server.
///
/// # Example
///
/// ```rust,no_run
/// use blastgrid::prelude::*;
///
/// # async fn run() -> Result<(), BlastgridError> {
/// let server = BlastgridServer::builder()
///     .bind("0.0.0.0:8080")
///     .room_config(RoomConfig::default())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct BlastgridServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl BlastgridServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration every new room is created with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<BlastgridServer, BlastgridError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            directory: Mutex::new(RoomDirectory::new(self.room_config)),
            codec: JsonCodec,
        });

        Ok(BlastgridServer { transport, state })
    }
}

impl Default for BlastgridServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Blastgrid server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BlastgridServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl BlastgridServer {
    /// Creates a new builder.
    pub fn builder() -> BlastgridServerBuilder {
        BlastgridServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning one handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), BlastgridError> {
        tracing::info!("blastgrid server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
