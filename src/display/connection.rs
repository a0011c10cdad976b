//! Per-agent connection handling.
//!
//! # Responsibilities
//! - Assign unique connection IDs for tracing
//! - Run the request/response loop for one agent
//! - Release the agent's channel when the connection ends

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::display::channel::{ChannelRegistry, OpenError};
use crate::display::codec::{self, ContentType, Frame, FrameError, ResultCode};
use crate::lifecycle::ShutdownSignal;

/// Global atomic counter for connection IDs.
/// Relaxed ordering is enough: only uniqueness matters.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an agent connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// One agent connection bound to the shared channel registry.
pub struct AgentConnection {
    id: ConnectionId,
    peer: SocketAddr,
    registry: Arc<ChannelRegistry>,
    max_frame_bytes: usize,
    idle_timeout: Duration,
    channel: Option<String>,
}

impl AgentConnection {
    pub fn new(
        peer: SocketAddr,
        registry: Arc<ChannelRegistry>,
        max_frame_bytes: usize,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            peer,
            registry,
            max_frame_bytes,
            idle_timeout,
            channel: None,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Serve frames until the peer closes, goes idle, sends a malformed
    /// frame, or shutdown fires. Shutdown also interrupts a blocked reply.
    pub async fn serve<S>(mut self, mut stream: S, mut shutdown: ShutdownSignal) -> Result<(), FrameError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let result = loop {
            let read = tokio::time::timeout(self.idle_timeout, codec::read_frame(&mut stream, self.max_frame_bytes));
            let frame = tokio::select! {
                _ = shutdown.recv() => break Ok(()),
                frame = read => frame,
            };

            let frame = match frame {
                Ok(Ok(Some(frame))) => frame,
                Ok(Ok(None)) => break Ok(()),
                Ok(Err(e)) => break Err(e),
                Err(_) => break Err(FrameError::IdleTimeout(self.idle_timeout)),
            };

            if let Some(reply) = self.dispatch(frame) {
                let written = tokio::select! {
                    _ = shutdown.recv() => break Ok(()),
                    written = codec::write_frame(&mut stream, &reply) => written,
                };
                if let Err(e) = written {
                    break Err(e);
                }
            }
        };

        if let Some(channel) = self.channel.take() {
            self.registry.close(&channel, self.id);
            tracing::info!(connection_id = %self.id, channel = %channel, "Channel closed");
        }
        result
    }

    fn dispatch(&mut self, frame: Frame) -> Option<Frame> {
        match frame.name.as_str() {
            codec::OPEN_CHANNEL_REQUEST => Some(Frame::response(codec::OPEN_CHANNEL_RESPONSE, self.open_channel(&frame.body))),
            codec::PRESENT_IMAGE_REQUEST => {
                let code = match &self.channel {
                    Some(channel) if self.registry.record_frame(channel, frame.body.len()) => ResultCode::Ok,
                    _ => ResultCode::ChannelNotOpen,
                };
                Some(Frame::response(codec::PRESENT_IMAGE_RESPONSE, code))
            }
            codec::HEARTBEAT_MESSAGE => {
                if let Some(channel) = &self.channel {
                    self.registry.touch(channel);
                }
                None
            }
            other => {
                tracing::warn!(connection_id = %self.id, message = %other, "Ignoring unknown message");
                None
            }
        }
    }

    fn open_channel(&mut self, body: &[u8]) -> ResultCode {
        let Some((&kind, name)) = body.split_first() else {
            return ResultCode::InvalidChannelName;
        };
        let Some(content_type) = ContentType::from_byte(kind) else {
            return ResultCode::UnsupportedContentType;
        };
        let Ok(name) = std::str::from_utf8(name) else {
            return ResultCode::InvalidChannelName;
        };

        if let Some(current) = &self.channel {
            if current != name {
                self.registry.close(current, self.id);
            }
        }

        match self.registry.open(name, content_type, self.id, self.peer) {
            Ok(()) => {
                tracing::info!(
                    connection_id = %self.id,
                    peer = %self.peer,
                    channel = %name,
                    ?content_type,
                    "Channel opened"
                );
                self.channel = Some(name.to_string());
                ResultCode::Ok
            }
            Err(OpenError::AlreadyOpen) => {
                tracing::warn!(connection_id = %self.id, channel = %name, "Channel already open");
                self.channel = None;
                ResultCode::ChannelAlreadyOpen
            }
            Err(OpenError::InvalidName) => {
                self.channel = None;
                ResultCode::InvalidChannelName
            }
        }
    }
}
