//! Wire protocol spoken between the agendakit client and server.
//!
//! A message is one frame on the Unix socket: a big-endian `u32` byte count
//! followed by that many bytes of JSON. The JSON is always an [`Envelope`]
//! carrying the protocol version, a request id for correlation, the session
//! id, and the [`Request`] or [`Response`] payload.
//!
//! [`FrameReader`] and [`FrameWriter`] are the only framing implementation;
//! both ends of the socket wrap their stream halves in them.
//!
//! ```rust
//! use agendakit_protocol::{Envelope, Request, encode_message};
//!
//! let request = Envelope::request("req-123", "default", Request::GetAgenda);
//! let frame = encode_message(&request).unwrap();
//! assert_eq!(u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize,
//!            frame.len() - 4);
//! ```

mod error;
mod framing;
mod types;

pub use error::{ProtocolError, ProtocolResult};
pub use framing::{FrameReader, FrameWriter, encode_message};
pub use types::{
    DetailsPatch, Envelope, ErrorCode, ErrorResponse, Request, Response, StatusInfo,
};

/// Version stamped into every envelope. Bump on breaking wire changes.
pub const PROTOCOL_VERSION: &str = "1";

/// Upper bound on a frame body, 1 MiB. Agendas are small; anything near
/// this is a corrupt prefix or a misbehaving peer.
pub const MAX_MESSAGE_SIZE: u32 = 1024 * 1024;
