//! Transport seam between the connection manager and the network.
//!
//! The manager treats a connection as an opaque bidirectional text-frame
//! channel: it pushes [`TransportCommand`]s in and consumes a stream of
//! [`TransportEvent`]s out. [`WsConnector`] is the production
//! implementation over tokio-tungstenite; tests substitute their own
//! [`Connector`].

mod ws;

pub use ws::WsConnector;

use tokio::sync::mpsc;

/// WebSocket normal-closure code, used by graceful disconnects.
pub const CLOSE_NORMAL: u16 = 1000;

/// Events emitted by a transport, in order. Exactly one
/// [`TransportEvent::Closed`] terminates every event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The dial succeeded and the connection is established.
    Open,
    /// One inbound text frame.
    Message(String),
    /// The transport hit an error. Always followed eventually by
    /// [`TransportEvent::Closed`].
    Error(String),
    /// The connection is gone. `clean` is true only when a graceful close
    /// handshake completed.
    Closed {
        /// Whether the close completed a graceful handshake.
        clean: bool,
        /// Close code supplied by the peer, if any.
        code: Option<u16>,
    },
}

/// Commands accepted by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    /// Send one text frame. Fire-and-forget.
    Send(String),
    /// Request a graceful close with an optional close code.
    Close(Option<u16>),
}

/// A freshly dialed transport: the command sender paired with the event
/// stream. The dial itself happens asynchronously; its outcome arrives as
/// either [`TransportEvent::Open`] or an error followed by a close.
pub struct TransportLink {
    /// Command half, retained by the manager as a [`TransportHandle`].
    pub commands: mpsc::UnboundedSender<TransportCommand>,
    /// Event half, consumed by the manager's event pump.
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl TransportLink {
    /// Create a link backed by fresh channels, returning the transport's
    /// ends alongside it. Connector implementations call this.
    pub fn pair() -> (
        Self,
        mpsc::UnboundedReceiver<TransportCommand>,
        mpsc::UnboundedSender<TransportEvent>,
    ) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let link = Self {
            commands: command_tx,
            events: event_rx,
        };
        (link, command_rx, event_tx)
    }
}

/// The write half of a live transport, held by the manager while the
/// connection state says one exists.
#[derive(Debug, Clone)]
pub struct TransportHandle {
    commands: mpsc::UnboundedSender<TransportCommand>,
}

impl TransportHandle {
    /// Wrap the command half of a [`TransportLink`].
    pub fn new(commands: mpsc::UnboundedSender<TransportCommand>) -> Self {
        Self { commands }
    }

    /// Queue one text frame. Fails only when the transport task is gone.
    pub fn send_text(&self, frame: String) -> Result<(), TransportGone> {
        self.commands
            .send(TransportCommand::Send(frame))
            .map_err(|_| TransportGone)
    }

    /// Request a graceful close. A transport that is already gone has
    /// nothing left to close, so failures are ignored.
    pub fn close(&self, code: Option<u16>) {
        let _ = self.commands.send(TransportCommand::Close(code));
    }
}

/// The transport task has terminated and can accept no more commands.
#[derive(Debug, thiserror::Error)]
#[error("transport is gone")]
pub struct TransportGone;

/// Dials transports. `connect` returns immediately, mirroring the
/// constructor semantics of a browser WebSocket: the outcome of the dial
/// is observed through the link's event stream.
pub trait Connector: Send + Sync + 'static {
    /// Start dialing `host` and return the link to the new transport.
    fn connect(&self, host: &str) -> TransportLink;
}
