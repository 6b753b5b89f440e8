//! Outbound send payloads.

use serde::{Deserialize, Serialize};

use crate::error::EncodeError;

/// One outbound MIDI message, addressed to a device by name.
///
/// Unlike inbound frames, the send payload carries no `type`
/// discriminator; the relay defines the wire format that way and the
/// asymmetry is preserved. A channel with no bound device name sends
/// `"device_name": null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiSend {
    /// Target device name, or `null` for an unbound channel.
    pub device_name: Option<String>,
    /// MIDI status byte.
    pub status: u8,
    /// First data byte: the note number.
    pub note_number: u8,
    /// Second data byte: the velocity.
    pub velocity: u8,
}

impl MidiSend {
    /// Serialize to the JSON text frame handed to the transport.
    pub fn encode(&self) -> Result<String, EncodeError> {
        serde_json::to_string(self).map_err(EncodeError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_without_type_discriminator() {
        let payload = MidiSend {
            device_name: Some("synth1".into()),
            status: 144,
            note_number: 60,
            velocity: 100,
        };
        let text = payload.encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value.get("type").is_none());
        assert_eq!(value["device_name"], "synth1");
        assert_eq!(value["status"], 144);
        assert_eq!(value["note_number"], 60);
        assert_eq!(value["velocity"], 100);
    }

    #[test]
    fn unbound_channel_sends_null_device_name() {
        let payload = MidiSend {
            device_name: None,
            status: 128,
            note_number: 60,
            velocity: 0,
        };
        let value: serde_json::Value =
            serde_json::from_str(&payload.encode().unwrap()).unwrap();
        assert!(value["device_name"].is_null());
    }

    #[test]
    fn server_side_decode_round_trips() {
        let payload = MidiSend {
            device_name: Some("drums".into()),
            status: 153,
            note_number: 42,
            velocity: 127,
        };
        let decoded: MidiSend =
            serde_json::from_str(&payload.encode().unwrap()).unwrap();
        assert_eq!(decoded, payload);
    }
}
