//! What can go wrong on the wire.

use thiserror::Error;

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Failures while framing, parsing, or waiting for messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Length prefix names a frame bigger than we accept.
    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    MessageTooLarge { size: u32, max: u32 },

    /// Body did not serialize or parse as JSON.
    #[error("malformed message body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Read or write failed under the framing layer.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Length prefix of zero.
    #[error("empty frame")]
    EmptyMessage,

    /// The peer took too long.
    #[error("timed out while {operation}")]
    Timeout { operation: String },
}
