//! Channel lookup by name.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{ChannelErrorKind, ModuleError, ModuleResult};

use super::session::Channel;

/// Finds live channels by name. Provided by the host platform.
pub trait ChannelRegistry: Send + Sync {
    /// Look up a channel by name (case-insensitive).
    fn find_by_name(&self, name: &str) -> Option<Arc<Channel>>;

    /// Like [`find_by_name`](Self::find_by_name), failing with
    /// `ChannelErrorKind::NotFound` for unknown channels.
    fn get(&self, name: &str) -> ModuleResult<Arc<Channel>> {
        self.find_by_name(name).ok_or_else(|| ModuleError::Channel {
            kind: ChannelErrorKind::NotFound {
                name: name.to_string(),
            },
        })
    }
}

/// In-memory channel table.
#[derive(Debug, Default)]
pub struct InMemoryChannels {
    channels: RwLock<HashMap<String, Arc<Channel>>>,
}

impl InMemoryChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel and add it to the table, replacing any with that name.
    pub fn create(&self, name: &str) -> Arc<Channel> {
        let channel = Arc::new(Channel::new(name));
        if let Ok(mut channels) = self.channels.write() {
            channels.insert(name.to_lowercase(), Arc::clone(&channel));
            debug!(channel = name, "Channel created");
        }
        channel
    }

    /// Remove a channel (hangup).
    pub fn remove(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.write().ok()?.remove(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.channels.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChannelRegistry for InMemoryChannels {
    fn find_by_name(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.read().ok()?.get(&name.to_lowercase()).cloned()
    }
}
