//! Cancellable timers owned by a room actor.

use std::time::Duration;

use tokio::time::{self, Instant};

/// A one-shot timer that can be armed, re-armed and cancelled.
///
/// [`fired`](Deadline::fired) completes once when the deadline passes and
/// disarms the timer. While disarmed it pends forever.
#[derive(Debug, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A disarmed deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the deadline `after` from now, replacing any previous arming.
    pub fn arm(&mut self, after: Duration) {
        self.at = Some(Instant::now() + after);
    }

    /// Disarms the deadline. No-op if already disarmed.
    pub fn cancel(&mut self) {
        self.at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    /// Completes when the deadline passes.
    ///
    /// Cancel-safe: dropping the future before it completes leaves the
    /// deadline armed.
    pub async fn fired(&mut self) {
        match self.at {
            Some(at) => {
                time::sleep_until(at).await;
                self.at = None;
            }
            None => std::future::pending().await,
        }
    }
}

/// A repeating timer with a fixed period.
///
/// Each call to [`fired`](Periodic::fired) completes at the next period
/// boundary. While cancelled it pends forever.
#[derive(Debug)]
pub struct Periodic {
    period: Duration,
    next: Option<Instant>,
}

impl Periodic {
    /// A stopped timer with the given period.
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// Starts (or restarts) the timer. The first firing is one period
    /// from now.
    pub fn start(&mut self) {
        self.next = Some(Instant::now() + self.period);
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next.is_some()
    }

    /// Completes at the next period boundary, then schedules the one
    /// after it.
    pub async fn fired(&mut self) {
        match self.next {
            Some(at) => {
                time::sleep_until(at).await;
                self.next = Some(at + self.period);
            }
            None => std::future::pending().await,
        }
    }
}
