//! Registry of channels opened by presenter agents.

use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

use crate::display::codec::ContentType;
use crate::display::connection::ConnectionId;

/// Longest accepted channel name, in bytes.
pub const MAX_CHANNEL_NAME_LEN: usize = 64;

/// Per-channel statistics, as shown by the web UI.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelStats {
    pub name: String,
    pub content_type: ContentType,
    pub connection_id: u64,
    pub peer: SocketAddr,
    pub frames: u64,
    pub bytes: u64,
    pub opened_at_unix_ms: u64,
    pub last_seen_unix_ms: u64,
}

/// Why a channel could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenError {
    /// Open on a different connection.
    AlreadyOpen,
    /// Empty, too long, or containing control characters.
    InvalidName,
}

/// Concurrent map of channel name to statistics.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: DashMap<String, ChannelStats>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `name` for connection `id`. Re-opening on the same connection is allowed.
    pub fn open(
        &self,
        name: &str,
        content_type: ContentType,
        id: ConnectionId,
        peer: SocketAddr,
    ) -> Result<(), OpenError> {
        if !is_valid_name(name) {
            return Err(OpenError::InvalidName);
        }

        match self.channels.entry(name.to_string()) {
            Entry::Occupied(entry) if entry.get().connection_id != id.as_u64() => Err(OpenError::AlreadyOpen),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                let now = unix_ms();
                entry.insert(ChannelStats {
                    name: name.to_string(),
                    content_type,
                    connection_id: id.as_u64(),
                    peer,
                    frames: 0,
                    bytes: 0,
                    opened_at_unix_ms: now,
                    last_seen_unix_ms: now,
                });
                Ok(())
            }
        }
    }

    /// Account one presented frame. Returns false if the channel is gone.
    pub fn record_frame(&self, name: &str, bytes: usize) -> bool {
        match self.channels.get_mut(name) {
            Some(mut stats) => {
                stats.frames += 1;
                stats.bytes += bytes as u64;
                stats.last_seen_unix_ms = unix_ms();
                true
            }
            None => false,
        }
    }

    pub fn touch(&self, name: &str) {
        if let Some(mut stats) = self.channels.get_mut(name) {
            stats.last_seen_unix_ms = unix_ms();
        }
    }

    /// Remove `name` if it still belongs to connection `id`.
    pub fn close(&self, name: &str, id: ConnectionId) {
        self.channels
            .remove_if(name, |_, stats| stats.connection_id == id.as_u64());
    }

    pub fn get(&self, name: &str) -> Option<ChannelStats> {
        self.channels.get(name).map(|stats| stats.clone())
    }

    /// Snapshot of all channels, sorted by name.
    pub fn snapshot(&self) -> Vec<ChannelStats> {
        let mut all: Vec<ChannelStats> = self.channels.iter().map(|entry| entry.value().clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn clear(&self) {
        self.channels.clear();
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty() && name.len() <= MAX_CHANNEL_NAME_LEN && !name.chars().any(char::is_control)
}

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
