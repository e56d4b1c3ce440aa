//! Invocation metadata.

use std::fmt;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

/// Which entry point triggered an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Invocation {
    /// Dialplan application.
    Application,
    /// Dialplan function.
    Function,
    /// Management action.
    Manager,
    /// Library call outside any entry point.
    Direct,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Invocation::Application => "application",
            Invocation::Function => "function",
            Invocation::Manager => "manager",
            Invocation::Direct => "direct",
        };
        f.write_str(name)
    }
}

/// Execution context for one invocation.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Unique identifier for this invocation.
    pub request_id: Uuid,
    /// The entry point.
    pub source: Invocation,
    /// The channel involved, if any.
    pub channel: Option<String>,
    /// When the invocation started.
    pub started: Instant,
}

impl ExecutionContext {
    pub fn new(source: Invocation) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            source,
            channel: None,
            started: Instant::now(),
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }
}
