//! # midisock-proto
//!
//! Wire frame model for the MIDI-relay protocol spoken by `midisock`.
//!
//! The relay exchanges JSON text frames. Inbound frames carry a `type`
//! discriminator and a `content` body; outbound send payloads carry no
//! discriminator at all (an asymmetry the relay defines, preserved here).
//! Frames are decoded exactly once at the transport boundary into the
//! [`ServerFrame`] tagged union, so nothing downstream compares type
//! strings.
//!
//! ```rust
//! use midisock_proto::ServerFrame;
//!
//! let raw = r#"{"type":"device_list","content":{"devices":["synth1"]}}"#;
//! match ServerFrame::decode(raw).unwrap() {
//!     ServerFrame::DeviceList(list) => assert_eq!(list.devices, ["synth1"]),
//!     other => panic!("unexpected frame: {:?}", other),
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod frame;
pub mod send;

pub use self::error::{DecodeError, EncodeError};
pub use self::frame::{DeviceList, MidiData, ServerFrame};
pub use self::send::MidiSend;
