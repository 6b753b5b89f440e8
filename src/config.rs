//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::MidiSocketError;

/// Default value functions referenced by `#[serde(default = ...)]`.
mod defaults {
    pub fn auto_reconnect() -> bool {
        true
    }

    /// Matches the relay reference client's one-second retry.
    pub fn reconnect_delay_ms() -> u64 {
        1000
    }

    pub fn event_buffer() -> usize {
        128
    }
}

/// Configuration for a [`MidiSocket`](crate::MidiSocket).
///
/// Loadable from TOML:
///
/// ```toml
/// host = "relay.example.net:8765"
/// auto_reconnect = true
/// reconnect_delay_ms = 1000
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SocketConfig {
    /// Relay address, dialed as `ws://{host}`. Immutable once the socket
    /// is constructed.
    pub host: String,

    /// Whether unclean disconnects schedule an automatic re-dial.
    #[serde(default = "defaults::auto_reconnect")]
    pub auto_reconnect: bool,

    /// Delay before each reconnect attempt, in milliseconds.
    #[serde(default = "defaults::reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Capacity of the notification broadcast ring. Subscribers that fall
    /// further behind than this observe a lag gap, not backpressure.
    #[serde(default = "defaults::event_buffer")]
    pub event_buffer: usize,
}

impl SocketConfig {
    /// Configuration for `host` with default policy everywhere else.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            auto_reconnect: defaults::auto_reconnect(),
            reconnect_delay_ms: defaults::reconnect_delay_ms(),
            event_buffer: defaults::event_buffer(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MidiSocketError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// The reconnect delay as a [`Duration`].
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}
