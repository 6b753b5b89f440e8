//! Connection lifecycle states.

use std::fmt;

/// Where a [`MidiSocket`](crate::MidiSocket) is in its lifecycle.
///
/// `Closing` is entered only by an explicit
/// [`disconnect`](crate::MidiSocket::disconnect); a peer-initiated close
/// moves straight from `Open` to `Closed` or `Reconnecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport, and none pending.
    Closed,
    /// A dial is in flight.
    Connecting,
    /// The connection is established.
    Open,
    /// A graceful close was requested and its handshake is in flight.
    Closing,
    /// Waiting out the reconnect delay before the next dial.
    Reconnecting,
}

impl ConnectionState {
    /// Whether a live transport handle accompanies this state.
    pub fn has_transport(self) -> bool {
        matches!(self, Self::Connecting | Self::Open | Self::Closing)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Reconnecting => "reconnecting",
        };
        f.write_str(name)
    }
}
