//! A single channel and its variables.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{ChannelErrorKind, ModuleError};

/// An active call/session holding named variables.
#[derive(Debug)]
pub struct Channel {
    name: String,
    variables: Mutex<HashMap<String, String>>,
}

/// Exclusive hold on a channel. The lock is released on drop.
pub struct ChannelGuard<'a> {
    variables: MutexGuard<'a, HashMap<String, String>>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Take the channel lock.
    pub fn lock(&self) -> Result<ChannelGuard<'_>, ModuleError> {
        let variables = self.variables.lock().map_err(|_| ModuleError::Channel {
            kind: ChannelErrorKind::LockPoisoned {
                name: self.name.clone(),
            },
        })?;
        Ok(ChannelGuard { variables })
    }

    /// Set a variable, holding the lock only for the assignment.
    pub fn set_variable(&self, name: &str, value: &str) -> Result<(), ModuleError> {
        self.lock()?.set_variable(name, value);
        Ok(())
    }

    /// Read a variable.
    pub fn variable(&self, name: &str) -> Option<String> {
        self.lock().ok()?.variable(name).map(str::to_string)
    }
}

impl ChannelGuard<'_> {
    pub fn set_variable(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
    }

    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}
