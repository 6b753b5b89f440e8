//! # midisock
//!
//! A resilient client for MIDI-relay servers. Maintains one persistent
//! WebSocket, recovers automatically from unclean disconnects, and fans
//! inbound MIDI events out to independently-addressable device channels
//! while serializing outbound messages back to the relay.
//!
//! The pieces:
//!
//! - [`MidiSocket`]: the connection manager; lifecycle state machine,
//!   reconnect policy, frame demultiplexing, device directory.
//! - [`DeviceChannel`]: a lightweight handle bound to one logical device
//!   name; subscribes to that device's inbound events and validates
//!   outbound sends.
//! - [`SocketEvent`]: the typed notification surface.
//! - [`transport`]: the seam to the network; [`transport::WsConnector`]
//!   is the production WebSocket implementation.
//! - [`midisock_proto`] (re-exported as [`proto`]): the wire frame model.
//!
//! The manager is callback-free: lifecycle and traffic are observed by
//! awaiting broadcast receivers, so any number of listeners can watch the
//! same connection without coordination.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod events;
pub mod socket;
pub mod state;
pub mod transport;

pub use midisock_proto as proto;

pub use config::SocketConfig;
pub use error::{MidiSocketError, SendError};
pub use events::SocketEvent;
pub use proto::{DecodeError, DeviceList, MidiData, MidiSend, ServerFrame};
pub use socket::{DeviceChannel, MidiSocket};
pub use state::ConnectionState;
pub use transport::{Connector, WsConnector};
