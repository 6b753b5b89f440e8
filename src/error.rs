//! Unified error handling for midisock.
//!
//! Each concern gets its own small enum; [`MidiSocketError`] is the
//! crate-level umbrella with `#[from]` conversions. Transport-level
//! failures are never returned from these types; they surface as
//! [`SocketEvent::Error`](crate::SocketEvent::Error) notifications and
//! are resolved by the close path.

use midisock_proto::{DecodeError, EncodeError};
use thiserror::Error;

/// Errors returned synchronously by [`DeviceChannel::send`].
///
/// Always recoverable: nothing was sent and no state changed. Check
/// [`MidiSocket::state`](crate::MidiSocket::state) and retry later.
///
/// [`DeviceChannel::send`]: crate::DeviceChannel::send
#[derive(Debug, Error)]
pub enum SendError {
    /// The owning [`MidiSocket`](crate::MidiSocket) has been dropped.
    #[error("connection manager no longer exists")]
    ManagerGone,

    /// The channel was removed from its manager and can never send again.
    #[error("device channel is inactive")]
    ChannelInactive,

    /// No open connection: the manager is not in the `open` state or
    /// holds no live transport.
    #[error("no open connection")]
    NotConnected,

    /// The outbound payload could not be serialized.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Crate-level umbrella error.
#[derive(Debug, Error)]
pub enum MidiSocketError {
    /// A send precondition failed.
    #[error(transparent)]
    Send(#[from] SendError),

    /// An inbound frame could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A configuration file could not be read.
    #[error("failed to read config: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
