//! Tests for the cancellable lobby and countdown timers.

use std::time::Duration;

use blastgrid_tick::{Deadline, Periodic};
use tokio::time::{Instant, timeout};

// =========================================================================
// Deadline
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_deadline_fires_after_duration() {
    let mut d = Deadline::new();
    d.arm(Duration::from_secs(20));
    assert!(d.is_armed());

    let start = Instant::now();
    d.fired().await;
    assert_eq!(start.elapsed(), Duration::from_secs(20));
    assert!(!d.is_armed(), "a fired deadline disarms itself");
}

#[tokio::test(start_paused = true)]
async fn test_disarmed_deadline_pends_forever() {
    let mut d = Deadline::new();
    let result = timeout(Duration::from_secs(3600), d.fired()).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_deadline_never_fires() {
    let mut d = Deadline::new();
    d.arm(Duration::from_secs(1));
    d.cancel();
    assert!(!d.is_armed());

    let result = timeout(Duration::from_secs(10), d.fired()).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_rearming_replaces_deadline() {
    let mut d = Deadline::new();
    d.arm(Duration::from_secs(5));
    tokio::time::advance(Duration::from_secs(3)).await;
    d.arm(Duration::from_secs(5));
    assert!(d.is_armed());

    let start = Instant::now();
    d.fired().await;
    assert_eq!(start.elapsed(), Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_survives_losing_a_select_race() {
    let mut d = Deadline::new();
    d.arm(Duration::from_secs(2));

    tokio::select! {
        () = d.fired() => panic!("deadline fired too early"),
        () = tokio::time::sleep(Duration::from_secs(1)) => {}
    }
    assert!(d.is_armed());

    let start = Instant::now();
    d.fired().await;
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

// =========================================================================
// Periodic
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_periodic_fires_every_period() {
    let mut p = Periodic::new(Duration::from_secs(1));
    p.start();
    let start = Instant::now();

    for n in 1..=3u64 {
        p.fired().await;
        assert_eq!(start.elapsed(), Duration::from_secs(n));
    }
    assert!(p.is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_stopped_periodic_pends_forever() {
    let mut p = Periodic::new(Duration::from_secs(1));
    assert!(!p.is_armed());
    let result = timeout(Duration::from_secs(60), p.fired()).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_periodic_stops_firing() {
    let mut p = Periodic::new(Duration::from_secs(1));
    p.start();
    p.fired().await;
    p.cancel();

    let result = timeout(Duration::from_secs(60), p.fired()).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_restart_resets_phase() {
    let mut p = Periodic::new(Duration::from_secs(1));
    p.start();
    tokio::time::advance(Duration::from_millis(700)).await;
    p.start();

    let start = Instant::now();
    p.fired().await;
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}
