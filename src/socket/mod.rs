//! The connection manager.
//!
//! [`MidiSocket`] owns the connection lifecycle state machine, the
//! automatic-reconnect policy, the device directory, and the registry of
//! [`DeviceChannel`]s. All mutable state lives behind one mutex; during a
//! connection's life the transport event pump is the only writer, so
//! frame order, notification order, and channel dispatch order agree.

mod channel;

pub use channel::DeviceChannel;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use midisock_proto::ServerFrame;
use parking_lot::{Mutex, MutexGuard};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::config::SocketConfig;
use crate::events::SocketEvent;
use crate::state::ConnectionState;
use crate::transport::{
    Connector, TransportEvent, TransportHandle, WsConnector, CLOSE_NORMAL,
};

use self::channel::ChannelCore;

/// Manager state serialized behind the one lock.
pub(crate) struct SocketState {
    state: ConnectionState,
    transport: Option<TransportHandle>,
    auto_reconnect: bool,
    reconnect_delay: Duration,
    /// Most recent directory reported by the relay, replaced wholesale.
    device_names: Vec<String>,
    /// Every name ever reported. Grows monotonically.
    all_device_names: BTreeSet<String>,
    channels: Vec<Arc<ChannelCore>>,
}

/// State shared between socket handles, the event pump, and channels.
pub(crate) struct Shared {
    host: String,
    connector: Arc<dyn Connector>,
    events: broadcast::Sender<SocketEvent>,
    state: Mutex<SocketState>,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, SocketState> {
        self.state.lock()
    }
}

/// A persistent client connection to a MIDI-relay server.
///
/// Cheap to clone; clones share one connection. Construction does not
/// dial: call [`connect`](Self::connect), then observe the outcome
/// through [`subscribe`](Self::subscribe).
///
/// ```no_run
/// use midisock::{MidiSocket, SocketConfig, SocketEvent};
///
/// # async fn demo() {
/// let socket = MidiSocket::new(SocketConfig::new("relay.example.net:8765"));
/// let mut events = socket.subscribe();
/// socket.connect();
///
/// let synth = socket.create_device_channel(Some("synth1"));
/// let mut notes = synth.subscribe();
///
/// while let Ok(event) = events.recv().await {
///     if matches!(event, SocketEvent::Open) {
///         synth.send(144, 60, 100).unwrap();
///     }
/// }
/// # let _ = notes;
/// # }
/// ```
#[derive(Clone)]
pub struct MidiSocket {
    shared: Arc<Shared>,
}

impl MidiSocket {
    /// Create a manager dialing real WebSockets.
    pub fn new(config: SocketConfig) -> Self {
        Self::with_connector(config, Arc::new(WsConnector))
    }

    /// Create a manager with a custom [`Connector`]. This is the seam the
    /// test suite uses to substitute a scripted transport.
    pub fn with_connector(config: SocketConfig, connector: Arc<dyn Connector>) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer.max(1));
        let reconnect_delay = config.reconnect_delay();
        Self {
            shared: Arc::new(Shared {
                host: config.host,
                connector,
                events,
                state: Mutex::new(SocketState {
                    state: ConnectionState::Closed,
                    transport: None,
                    auto_reconnect: config.auto_reconnect,
                    reconnect_delay,
                    device_names: Vec::new(),
                    all_device_names: BTreeSet::new(),
                    channels: Vec::new(),
                }),
            }),
        }
    }

    /// Subscribe to the notification surface.
    ///
    /// Events already emitted are not replayed; subscribe before calling
    /// [`connect`](Self::connect) to observe the whole lifecycle.
    pub fn subscribe(&self) -> broadcast::Receiver<SocketEvent> {
        self.shared.events.subscribe()
    }

    /// Dial the relay.
    ///
    /// Returns immediately; the outcome arrives as [`SocketEvent::Open`]
    /// or [`SocketEvent::Error`] / [`SocketEvent::Closed`]. There is no
    /// guard against misuse: calling this while already connecting or
    /// open creates a second transport whose events interleave with the
    /// first. Callers are responsible for checking [`state`](Self::state)
    /// first; the reconnect timer calls this exactly once per unclean
    /// close.
    pub fn connect(&self) {
        connect_shared(&self.shared);
    }

    /// Request a graceful close (code 1000).
    ///
    /// Enters `closing`, which is what suppresses the reconnect policy:
    /// the subsequent close event always lands in `closed`, clean or not.
    /// Does nothing when no transport exists. A reconnect attempt that is
    /// already scheduled is NOT retracted and will still dial.
    pub fn disconnect(&self) {
        let mut guard = self.shared.lock();
        if let Some(transport) = &guard.transport {
            transport.close(Some(CLOSE_NORMAL));
            guard.state = ConnectionState::Closing;
            info!(host = %self.shared.host, "closing relay connection");
        }
    }

    /// Create and register a channel bound to `initial_device_name`
    /// (`None` leaves it unbound; it will receive nothing until bound).
    /// Multiple channels may share one device name; all of them receive
    /// that device's messages.
    pub fn create_device_channel(&self, initial_device_name: Option<&str>) -> DeviceChannel {
        let core = Arc::new(ChannelCore::new(
            initial_device_name.map(str::to_owned),
        ));
        self.shared.lock().channels.push(Arc::clone(&core));
        DeviceChannel {
            core,
            owner: Arc::downgrade(&self.shared),
        }
    }

    /// Unregister `channel` and permanently deactivate it. Removing a
    /// channel that was already removed is a no-op (the channel stays
    /// inactive).
    pub fn remove_device_channel(&self, channel: &DeviceChannel) {
        self.shared
            .lock()
            .channels
            .retain(|core| !Arc::ptr_eq(core, &channel.core));
        channel.core.deactivate();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.shared.lock().state
    }

    /// The relay address this manager dials.
    pub fn host(&self) -> &str {
        &self.shared.host
    }

    /// The most recent device directory reported by the relay.
    pub fn device_names(&self) -> Vec<String> {
        self.shared.lock().device_names.clone()
    }

    /// Every device name the relay has ever reported, sorted. Never
    /// shrinks.
    pub fn all_device_names(&self) -> BTreeSet<String> {
        self.shared.lock().all_device_names.clone()
    }

    /// Whether unclean closes schedule a re-dial.
    pub fn auto_reconnect(&self) -> bool {
        self.shared.lock().auto_reconnect
    }

    /// Change the reconnect policy. Turning it off does NOT retract an
    /// already-scheduled reconnect attempt; that dial still happens, and
    /// only the close after it honors the new policy.
    pub fn set_auto_reconnect(&self, auto_reconnect: bool) {
        self.shared.lock().auto_reconnect = auto_reconnect;
    }

    /// Change the delay used before future reconnect attempts.
    pub fn set_reconnect_delay(&self, delay: Duration) {
        self.shared.lock().reconnect_delay = delay;
    }
}

impl std::fmt::Debug for MidiSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiSocket")
            .field("host", &self.shared.host)
            .field("state", &self.shared.lock().state)
            .finish()
    }
}

/// Dial and install a new transport, then spawn its event pump. Free
/// function so the reconnect timer can re-dial without a `MidiSocket`.
fn connect_shared(shared: &Arc<Shared>) {
    info!(host = %shared.host, "connecting to relay");
    let link = shared.connector.connect(&shared.host);
    {
        let mut guard = shared.lock();
        guard.transport = Some(TransportHandle::new(link.commands));
        guard.state = ConnectionState::Connecting;
    }
    tokio::spawn(pump_events(Arc::clone(shared), link.events));
}

/// Consume one transport's event stream until its terminal close event.
async fn pump_events(
    shared: Arc<Shared>,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
) {
    while let Some(event) = events.recv().await {
        match event {
            TransportEvent::Open => {
                shared.lock().state = ConnectionState::Open;
                info!(host = %shared.host, "relay connection open");
                let _ = shared.events.send(SocketEvent::Open);
            }
            TransportEvent::Message(text) => handle_message(&shared, &text),
            TransportEvent::Error(reason) => {
                warn!(host = %shared.host, error = %reason, "transport error");
                // An errored connection is unusable; request closure and
                // let the close path decide about reconnecting.
                if let Some(transport) = &shared.lock().transport {
                    transport.close(None);
                }
                let _ = shared.events.send(SocketEvent::Error(reason));
            }
            TransportEvent::Closed { clean, code } => {
                handle_close(&shared, clean, code);
                return;
            }
        }
    }
}

/// The close path: decides between reconnecting and settling in `closed`.
fn handle_close(shared: &Arc<Shared>, clean: bool, code: Option<u16>) {
    let mut guard = shared.lock();
    let reconnect =
        !clean && guard.auto_reconnect && guard.state != ConnectionState::Closing;

    if reconnect {
        guard.state = ConnectionState::Reconnecting;
        guard.transport = None;
        let delay = guard.reconnect_delay;
        drop(guard);

        info!(host = %shared.host, delay_ms = delay.as_millis() as u64, "unclean close, scheduling reconnect");
        // Single-shot: each attempt that fails reschedules itself through
        // this same close path. Not cancellable once scheduled.
        let shared = Arc::clone(shared);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            connect_shared(&shared);
        });
    } else {
        guard.state = ConnectionState::Closed;
        guard.transport = None;
        drop(guard);

        info!(host = %shared.host, clean, code, "relay connection closed");
        let _ = shared.events.send(SocketEvent::Closed { clean, code });
    }
}

/// Decode one inbound frame, notify subscribers, then dispatch by type.
fn handle_message(shared: &Shared, text: &str) {
    let frame = match ServerFrame::decode(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(host = %shared.host, error = %e, "undecodable frame from relay");
            let _ = shared.events.send(SocketEvent::DecodeError(e.to_string()));
            return;
        }
    };

    // Every decodable frame is surfaced pre-dispatch, whatever its type.
    let _ = shared.events.send(SocketEvent::Message(frame.clone()));

    match frame {
        ServerFrame::DeviceList(list) => {
            let mut guard = shared.lock();
            guard.device_names = list.devices.clone();
            guard
                .all_device_names
                .extend(list.devices.iter().cloned());
            drop(guard);

            debug!(devices = ?list.devices, "device directory updated");
            let _ = shared.events.send(SocketEvent::DeviceList(list.devices));
        }
        ServerFrame::MidiData(data) => {
            // Fan-out: every matching channel receives the payload. Zero
            // matches is a silent drop.
            let guard = shared.lock();
            for core in &guard.channels {
                if core.matches(&data.device_name) {
                    core.deliver(data.clone());
                }
            }
        }
        ServerFrame::Unknown { frame_type, .. } => {
            debug!(frame_type = %frame_type, "ignoring unknown frame type");
        }
    }
}
