//! Integration test common infrastructure.
//!
//! Provides a scripted mock transport for driving the connection manager
//! deterministically, and a real tokio-tungstenite relay server for
//! end-to-end WebSocket tests.

#![allow(dead_code)]

pub mod mock;
pub mod relay;

use std::time::Duration;

use midisock::SocketEvent;
use tokio::sync::broadcast;

#[allow(unused_imports)]
pub use mock::MockConnector;
#[allow(unused_imports)]
pub use relay::{RelayConn, RelayServer};

/// Default timeout for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(2);

/// Install a test subscriber honoring `RUST_LOG`. Safe to call per test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Receive the next socket event or panic after [`WAIT`].
pub async fn recv_event(events: &mut broadcast::Receiver<SocketEvent>) -> SocketEvent {
    tokio::time::timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for socket event")
        .expect("event stream lagged or closed")
}

/// Poll `condition` until it holds or [`WAIT`] elapses.
pub async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting until {what}");
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
