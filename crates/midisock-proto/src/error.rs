//! Error types for the wire frame model.

use thiserror::Error;

/// Failure to decode an inbound relay frame.
///
/// Decode failures are never fatal to a connection; the manager surfaces
/// them as a notification and keeps reading.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame was not a JSON object with a `type` discriminator.
    #[error("malformed frame: {0}")]
    Frame(#[source] serde_json::Error),

    /// The `content` body did not match the shape its `type` declares.
    #[error("malformed {frame_type} content: {source}")]
    Content {
        /// The declared frame type.
        frame_type: String,
        /// The underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to encode an outbound send payload.
#[derive(Debug, Error)]
#[error("failed to encode outbound payload: {0}")]
pub struct EncodeError(#[from] serde_json::Error);
