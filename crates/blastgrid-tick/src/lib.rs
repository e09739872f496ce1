//! Time sources for Blastgrid room actors.
//!
//! - [`TickScheduler`]: fixed-timestep simulation ticks (60 Hz in a
//!   running match) with overrun detection and budget monitoring.
//! - [`Deadline`]: a cancellable one-shot timer (the lobby wait).
//! - [`Periodic`]: a cancellable repeating timer (the countdown).
//!
//! All three are plain values owned by the room actor and awaited from
//! its `tokio::select!` loop. When a timer is disarmed its future pends
//! forever, so a cancelled timer can never fire into a later state:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => { /* may arm or cancel timers */ }
//!         () = lobby.fired() => { /* lobby wait elapsed */ }
//!         () = countdown.fired() => { /* one second passed */ }
//!         info = scheduler.wait_for_tick() => { /* step the simulation */ }
//!     }
//! }
//! ```

mod scheduler;
mod timer;

pub use scheduler::{TickConfig, TickInfo, TickMetrics, TickPolicy, TickScheduler};
pub use timer::{Deadline, Periodic};
