//! Inbound relay frames.
//!
//! Every inbound frame is a JSON object of the shape
//! `{ "type": <string>, "content": <object> }`. The two types the relay
//! currently emits are `device_list` and `midi_data`; anything else
//! decodes to [`ServerFrame::Unknown`] so the directory of types can grow
//! without breaking older clients.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Content of a `device_list` frame: the relay's current device directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceList {
    /// Ordered device names, replacing any previously reported directory.
    pub devices: Vec<String>,
}

/// Content of a `midi_data` frame: one MIDI event from a named device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiData {
    /// Name of the device that produced the event.
    pub device_name: String,
    /// MIDI status byte (e.g. 144 for note-on, channel 1).
    pub status: u8,
    /// First data byte: the note number.
    pub note_number: u8,
    /// Second data byte: the velocity.
    pub velocity: u8,
}

/// An inbound frame, decoded once at the transport boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerFrame {
    /// A `device_list` frame.
    DeviceList(DeviceList),
    /// A `midi_data` frame.
    MidiData(MidiData),
    /// A frame with a type this client does not recognize.
    Unknown {
        /// The declared `type` discriminator.
        frame_type: String,
        /// The raw `content` body, untouched.
        content: serde_json::Value,
    },
}

/// Outer envelope shared by every inbound frame.
#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    frame_type: String,
    #[serde(default)]
    content: serde_json::Value,
}

impl ServerFrame {
    /// Decode one inbound text frame.
    ///
    /// Unrecognized `type` values are not an error; they decode to
    /// [`ServerFrame::Unknown`]. A missing discriminator or a `content`
    /// body that does not match its declared type is a [`DecodeError`].
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let raw: RawFrame = serde_json::from_str(text).map_err(DecodeError::Frame)?;

        match raw.frame_type.as_str() {
            "device_list" => serde_json::from_value(raw.content)
                .map(ServerFrame::DeviceList)
                .map_err(|source| DecodeError::Content {
                    frame_type: raw.frame_type,
                    source,
                }),
            "midi_data" => serde_json::from_value(raw.content)
                .map(ServerFrame::MidiData)
                .map_err(|source| DecodeError::Content {
                    frame_type: raw.frame_type,
                    source,
                }),
            _ => Ok(ServerFrame::Unknown {
                frame_type: raw.frame_type,
                content: raw.content,
            }),
        }
    }

    /// The frame's declared type discriminator.
    pub fn frame_type(&self) -> &str {
        match self {
            ServerFrame::DeviceList(_) => "device_list",
            ServerFrame::MidiData(_) => "midi_data",
            ServerFrame::Unknown { frame_type, .. } => frame_type,
        }
    }
}
