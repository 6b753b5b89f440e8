//! Typed notification surface.
//!
//! Replaces the stringly-typed event-emitter of the reference client with
//! one fixed enum fanned out over a `tokio::sync::broadcast` channel;
//! every subscriber sees every event in processing order.

use midisock_proto::ServerFrame;

/// Notifications broadcast by a [`MidiSocket`](crate::MidiSocket).
///
/// Obtained via [`MidiSocket::subscribe`](crate::MidiSocket::subscribe).
/// Events are emitted in the order their frames were processed; frame
/// order, notification order, and channel dispatch order all agree.
#[derive(Debug, Clone)]
pub enum SocketEvent {
    /// The connection is established; sends are now valid.
    Open,

    /// The connection is gone and no reconnect is scheduled. `clean`
    /// mirrors whether the close completed a graceful handshake; `code`
    /// is the close code when the peer supplied one.
    Closed {
        /// Whether the close was graceful.
        clean: bool,
        /// Close code, if any.
        code: Option<u16>,
    },

    /// The transport reported an error. The manager reacts by requesting
    /// closure; the close path decides whether to reconnect.
    Error(String),

    /// Every decodable inbound frame, emitted before type dispatch.
    Message(ServerFrame),

    /// The device directory changed; carries the post-update sequence.
    DeviceList(Vec<String>),

    /// An inbound frame could not be decoded. The connection stays up.
    DecodeError(String),
}
