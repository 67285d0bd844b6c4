//! Length-prefixed framing for the wire.
//!
//! Every message crosses the socket as a 4-byte big-endian length prefix
//! followed by that many bytes of JSON. [`FrameReader`] and [`FrameWriter`]
//! are the only framing implementation in the workspace; both ends wrap
//! their stream halves in them instead of touching the prefix themselves.

use serde::{Serialize, de::DeserializeOwned};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::MAX_MESSAGE_SIZE;
use crate::error::{ProtocolError, ProtocolResult};

/// Encodes a message into a complete frame, prefix included.
///
/// ```rust
/// use agendakit_protocol::{Envelope, Request, encode_message};
///
/// let envelope = Envelope::request("req-1", "default", Request::Ping);
/// let frame = encode_message(&envelope).unwrap();
/// assert!(frame.len() > 4); // at least the length prefix
/// ```
pub fn encode_message<T: Serialize>(message: &T) -> ProtocolResult<Vec<u8>> {
    let body = serde_json::to_vec(message)?;
    let len = body.len() as u32;

    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decodes frames arriving on a stream half.
pub struct FrameReader<R> {
    stream: R,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Wraps the given stream half.
    pub fn new(stream: R) -> Self {
        Self { stream }
    }

    /// Reads one framed message.
    ///
    /// Returns `Ok(None)` when the peer hangs up between frames. A frame
    /// that is empty, truncated, or larger than [`MAX_MESSAGE_SIZE`] is an
    /// error.
    pub async fn read_message<T: DeserializeOwned>(&mut self) -> ProtocolResult<Option<T>> {
        let mut prefix = [0u8; 4];
        match self.stream.read_exact(&mut prefix).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_be_bytes(prefix) as usize;
        if len == 0 {
            return Err(ProtocolError::EmptyMessage);
        }
        if len > MAX_MESSAGE_SIZE as usize {
            return Err(ProtocolError::MessageTooLarge {
                size: len as u32,
                max: MAX_MESSAGE_SIZE,
            });
        }

        let mut body = vec![0u8; len];
        self.stream.read_exact(&mut body).await?;

        Ok(Some(serde_json::from_slice(&body)?))
    }
}

/// Encodes frames onto a stream half.
pub struct FrameWriter<W> {
    stream: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Wraps the given stream half.
    pub fn new(stream: W) -> Self {
        Self { stream }
    }

    /// Writes one framed message and flushes it.
    ///
    /// The prefix and the body leave in a single write.
    pub async fn write_message<T: Serialize>(&mut self, message: &T) -> ProtocolResult<()> {
        let frame = encode_message(message)?;
        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
