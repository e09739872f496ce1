use std::time::Duration;

use blastgrid::prelude::*;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Blastgrid game server.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Simulation ticks per second.
    #[arg(long, default_value_t = 60)]
    tick_rate: u32,

    /// Seconds a lobby with two or three players waits before the
    /// countdown starts.
    #[arg(long, default_value_t = 20)]
    lobby_wait_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), BlastgridError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let room_config = RoomConfig {
        tick_rate: args.tick_rate,
        lobby_wait: Duration::from_secs(args.lobby_wait_secs),
        ..RoomConfig::default()
    };

    let server = BlastgridServer::builder()
        .bind(&args.bind)
        .room_config(room_config)
        .build()
        .await?;
    tracing::info!(addr = %args.bind, tick_rate = args.tick_rate, "listening");
    server.run().await
}
