//! Management responses.

use std::fmt;

/// The `Response:` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Success,
    Error,
    Fail,
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseKind::Success => f.write_str("Success"),
            ResponseKind::Error => f.write_str("Error"),
            ResponseKind::Fail => f.write_str("Fail"),
        }
    }
}

/// A response to a management action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerResponse {
    pub kind: ResponseKind,
    /// Echo of the request's `ActionID`.
    pub action_id: Option<String>,
    /// `Message:` header.
    pub message: Option<String>,
    /// Raw command output, written after the headers.
    pub output: Option<String>,
}

impl ManagerResponse {
    fn new(kind: ResponseKind) -> Self {
        Self {
            kind,
            action_id: None,
            message: None,
            output: None,
        }
    }

    /// Acknowledge with a message.
    pub fn ack(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(ResponseKind::Success)
        }
    }

    /// Success carrying raw output.
    pub fn output(output: impl Into<String>) -> Self {
        Self {
            output: Some(output.into()),
            ..Self::new(ResponseKind::Success)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(ResponseKind::Error)
        }
    }

    /// Failure without payload.
    pub fn fail() -> Self {
        Self::new(ResponseKind::Fail)
    }

    /// Set the ActionID echo.
    pub fn with_action_id(mut self, action_id: Option<&str>) -> Self {
        self.action_id = action_id.map(str::to_string);
        self
    }

    pub fn is_success(&self) -> bool {
        self.kind == ResponseKind::Success
    }

    /// Render as `Key: Value\r\n` lines, raw output, and a blank line.
    pub fn to_wire(&self) -> String {
        let mut wire = format!("Response: {}\r\n", self.kind);
        if let Some(id) = &self.action_id {
            wire.push_str(&format!("ActionID: {}\r\n", id));
        }
        if let Some(message) = &self.message {
            wire.push_str(&format!("Message: {}\r\n", message));
        }
        if let Some(output) = &self.output {
            wire.push_str(output);
            if !output.ends_with('\n') {
                wire.push_str("\r\n");
            }
        }
        wire.push_str("\r\n");
        wire
    }
}

impl fmt::Display for ManagerResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}
