//! Captured command output.

use std::borrow::Cow;
use std::time::Duration;

/// Fixed-capacity stdout capture.
///
/// The buffer is always `capacity` bytes long and zero-filled past the
/// captured bytes. The text value ends at the first NUL byte, so an all-zero
/// buffer reads as empty, and callers treat empty as failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    buffer: Vec<u8>,
    len: usize,
    truncated: bool,
    exit_code: Option<i32>,
    duration: Duration,
}

impl CommandOutput {
    /// An all-zero buffer: the failure value.
    pub fn empty(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            len: 0,
            truncated: false,
            exit_code: None,
            duration: Duration::ZERO,
        }
    }

    /// Place captured bytes into a zero-filled buffer of `capacity` bytes.
    ///
    /// Bytes past the capacity are dropped and flag the output as truncated.
    pub fn from_captured(
        capacity: usize,
        captured: &[u8],
        truncated: bool,
        exit_code: Option<i32>,
        duration: Duration,
    ) -> Self {
        let len = captured.len().min(capacity);
        let mut buffer = vec![0; capacity];
        buffer[..len].copy_from_slice(&captured[..len]);

        Self {
            buffer,
            len,
            truncated: truncated || captured.len() > capacity,
            exit_code,
            duration,
        }
    }

    /// The whole buffer, zero padding included.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// The bytes the child actually wrote (up to capacity).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Number of bytes the child wrote (up to capacity).
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when there is no text before the first NUL byte.
    pub fn is_empty(&self) -> bool {
        self.buffer.first().map_or(true, |b| *b == 0)
    }

    /// Whether the child wrote more than the buffer could hold.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Output as text, up to the first NUL byte. Invalid UTF-8 is replaced.
    pub fn text(&self) -> Cow<'_, str> {
        let end = self
            .buffer
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(self.buffer.len());
        String::from_utf8_lossy(&self.buffer[..end])
    }

    /// The text value, or `None` when the output is empty.
    pub fn into_text(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.text().into_owned())
        }
    }
}
