//! Device channels: per-device subscription and send handles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use midisock_proto::{MidiData, MidiSend};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::error::SendError;
use crate::state::ConnectionState;

use super::Shared;

/// Routed payloads buffered per subscriber before lag sets in.
const CHANNEL_BUFFER: usize = 64;

/// State shared between a [`DeviceChannel`] handle and the manager's
/// registry entry for it.
pub(super) struct ChannelCore {
    device_name: Mutex<Option<String>>,
    active: AtomicBool,
    routed: broadcast::Sender<MidiData>,
}

impl ChannelCore {
    pub(super) fn new(device_name: Option<String>) -> Self {
        let (routed, _) = broadcast::channel(CHANNEL_BUFFER);
        Self {
            device_name: Mutex::new(device_name),
            active: AtomicBool::new(true),
            routed,
        }
    }

    /// Routing predicate: exact equality against a bound name. An unbound
    /// channel matches nothing.
    pub(super) fn matches(&self, device_name: &str) -> bool {
        self.device_name
            .lock()
            .as_deref()
            .is_some_and(|name| name == device_name)
    }

    /// Forward one routed payload to every subscriber. A channel with no
    /// live subscribers just drops it.
    pub(super) fn deliver(&self, data: MidiData) {
        let _ = self.routed.send(data);
    }

    pub(super) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

/// A logical subscription/send handle bound to one MIDI device name,
/// independent of the underlying transport.
///
/// Created only by [`MidiSocket::create_device_channel`]; removed only by
/// [`MidiSocket::remove_device_channel`], which permanently deactivates
/// it. Clones share the same registration.
///
/// [`MidiSocket::create_device_channel`]: super::MidiSocket::create_device_channel
/// [`MidiSocket::remove_device_channel`]: super::MidiSocket::remove_device_channel
#[derive(Clone)]
pub struct DeviceChannel {
    pub(super) core: Arc<ChannelCore>,
    // Non-owning: a lingering channel handle must not keep a dropped
    // manager or its transport alive.
    pub(super) owner: Weak<Shared>,
}

impl DeviceChannel {
    /// Subscribe to payloads routed to this channel's device name.
    ///
    /// Every subscriber receives every routed payload in arrival order;
    /// multiple subscribers all fire per message.
    pub fn subscribe(&self) -> broadcast::Receiver<MidiData> {
        self.core.routed.subscribe()
    }

    /// The bound device name, if any.
    pub fn device_name(&self) -> Option<String> {
        self.core.device_name.lock().clone()
    }

    /// Rebind the channel. `None` unbinds it: an unbound channel receives
    /// nothing, though it may still send (with a null device name).
    pub fn set_device_name(&self, device_name: Option<String>) {
        *self.core.device_name.lock() = device_name;
    }

    /// Whether the channel is still registered with its manager.
    pub fn is_active(&self) -> bool {
        self.core.active.load(Ordering::Acquire)
    }

    /// Send one MIDI message to this channel's device.
    ///
    /// Requires the owning manager to be alive and `open`, holding a live
    /// transport, and this channel to be active; otherwise fails with a
    /// [`SendError`] and no side effect. Fire-and-forget on success; the
    /// relay sends no acknowledgement.
    pub fn send(&self, status: u8, note_number: u8, velocity: u8) -> Result<(), SendError> {
        let shared = self.owner.upgrade().ok_or(SendError::ManagerGone)?;
        if !self.is_active() {
            return Err(SendError::ChannelInactive);
        }

        let guard = shared.lock();
        if guard.state != ConnectionState::Open {
            return Err(SendError::NotConnected);
        }
        let transport = guard.transport.as_ref().ok_or(SendError::NotConnected)?;

        let payload = MidiSend {
            device_name: self.device_name(),
            status,
            note_number,
            velocity,
        };
        let frame = payload.encode()?;
        transport
            .send_text(frame)
            .map_err(|_| SendError::NotConnected)
    }
}

impl std::fmt::Debug for DeviceChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceChannel")
            .field("device_name", &self.device_name())
            .field("active", &self.is_active())
            .finish()
    }
}
