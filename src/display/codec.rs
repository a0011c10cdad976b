//! Agent wire framing.
//!
//! ```text
//! +----------------+-----------+------------------+-----------+
//! | total len (BE) | name len  | message name     | body      |
//! |    4 bytes     |  1 byte   | name len bytes   | remaining |
//! +----------------+-----------+------------------+-----------+
//! ```
//!
//! The total length includes the 4-byte header itself; the frame limit
//! applies to everything after it.
//!
//! An `OpenChannelRequest` body is one content-type byte followed by the
//! UTF-8 channel name.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the length prefix.
pub const HEADER_LEN: usize = 4;

pub const OPEN_CHANNEL_REQUEST: &str = "OpenChannelRequest";
pub const OPEN_CHANNEL_RESPONSE: &str = "OpenChannelResponse";
pub const PRESENT_IMAGE_REQUEST: &str = "PresentImageRequest";
pub const PRESENT_IMAGE_RESPONSE: &str = "PresentImageResponse";
pub const HEARTBEAT_MESSAGE: &str = "HeartbeatMessage";

/// Result code carried in response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResultCode {
    Ok = 0,
    ChannelAlreadyOpen = 1,
    InvalidChannelName = 2,
    ChannelNotOpen = 3,
    UnsupportedContentType = 4,
}

impl ResultCode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ResultCode::Ok),
            1 => Some(ResultCode::ChannelAlreadyOpen),
            2 => Some(ResultCode::InvalidChannelName),
            3 => Some(ResultCode::ChannelNotOpen),
            4 => Some(ResultCode::UnsupportedContentType),
            _ => None,
        }
    }
}

/// Kind of content an agent presents on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ContentType {
    Image = 0,
    Video = 1,
}

impl ContentType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(ContentType::Image),
            1 => Some(ContentType::Video),
            _ => None,
        }
    }
}

/// Body of an `OpenChannelRequest`.
pub fn open_channel_body(content_type: ContentType, name: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(1 + name.len());
    body.push(content_type as u8);
    body.extend_from_slice(name.as_bytes());
    body
}

/// One decoded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub name: String,
    pub body: Vec<u8>,
}

impl Frame {
    pub fn new(name: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Response frame carrying a single result code.
    pub fn response(name: &str, code: ResultCode) -> Self {
        Self::new(name, vec![code as u8])
    }

    /// Total encoded size, header included.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + 1 + self.name.len() + self.body.len()
    }

    /// Encode into a single buffer.
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let name_len = u8::try_from(self.name.len()).map_err(|_| FrameError::NameTooLong(self.name.len()))?;
        let total = self.encoded_len();
        let total_u32 = u32::try_from(total).map_err(|_| FrameError::Oversized { size: total, limit: u32::MAX as usize })?;

        let mut buf = Vec::with_capacity(total);
        buf.extend_from_slice(&total_u32.to_be_bytes());
        buf.push(name_len);
        buf.extend_from_slice(self.name.as_bytes());
        buf.extend_from_slice(&self.body);
        Ok(buf)
    }
}

/// Framing errors. Any of them ends the connection.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("connection closed mid-frame")]
    Truncated,

    #[error("malformed frame, size field = {0}")]
    Malformed(u32),

    #[error("frame payload of {size} bytes exceeds limit of {limit}")]
    Oversized { size: usize, limit: usize },

    #[error("message name of {0} bytes is too long")]
    NameTooLong(usize),

    #[error("message name is not valid UTF-8")]
    InvalidName,

    #[error("no frame received for {0:?}")]
    IdleTimeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read one frame. `Ok(None)` on a clean close between frames.
pub async fn read_frame<R>(reader: &mut R, max_frame_bytes: usize) -> Result<Option<Frame>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let total = u32::from_be_bytes(header);
    let remaining = (total as usize).checked_sub(HEADER_LEN).ok_or(FrameError::Malformed(total))?;
    if remaining == 0 {
        return Err(FrameError::Malformed(total));
    }
    if remaining > max_frame_bytes {
        return Err(FrameError::Oversized {
            size: remaining,
            limit: max_frame_bytes,
        });
    }

    let mut payload = vec![0u8; remaining];
    reader.read_exact(&mut payload).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => FrameError::Truncated,
        _ => FrameError::Io(e),
    })?;

    let name_len = payload[0] as usize;
    if 1 + name_len > payload.len() {
        return Err(FrameError::Malformed(total));
    }
    let name = std::str::from_utf8(&payload[1..1 + name_len])
        .map_err(|_| FrameError::InvalidName)?
        .to_string();
    let body = payload.split_off(1 + name_len);

    Ok(Some(Frame { name, body }))
}

/// Write one frame and flush.
pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let buf = frame.encode()?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}
