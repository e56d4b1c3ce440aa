//! Bounded stream capture on helper threads.
//!
//! Each child pipe is drained by its own thread so the child never blocks on
//! a full pipe. Bytes past the capacity are read and discarded.

use std::io::{self, Read};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Bytes captured from one stream.
#[derive(Debug, Default)]
pub(crate) struct CapturedStream {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

/// Why a capture result was not received.
#[derive(Debug)]
pub(crate) enum CaptureError {
    /// The stream stayed open past the deadline.
    TimedOut,
    /// Reading failed, or the reader thread died.
    Failed(String),
}

/// Read `reader` until end-of-stream, keeping at most `capacity` bytes.
pub(crate) fn read_capped<R: Read>(mut reader: R, capacity: usize) -> io::Result<CapturedStream> {
    let mut bytes = vec![0u8; capacity];
    let mut filled = 0;

    while filled < capacity {
        match reader.read(&mut bytes[filled..]) {
            Ok(0) => {
                bytes.truncate(filled);
                return Ok(CapturedStream {
                    bytes,
                    truncated: false,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    // Buffer full: keep draining so the writer can finish
    let discarded = io::copy(&mut reader, &mut io::sink())?;
    Ok(CapturedStream {
        bytes,
        truncated: discarded > 0,
    })
}

/// Handle to a capture running on a helper thread.
pub(crate) struct StreamReader {
    rx: mpsc::Receiver<io::Result<CapturedStream>>,
}

impl StreamReader {
    /// Start draining `reader` on a new thread.
    pub fn spawn<R>(reader: R, capacity: usize, name: &str) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name(format!("capture-{}", name))
            .spawn(move || {
                // Receiver may be gone after a timeout
                let _ = tx.send(read_capped(reader, capacity));
            })?;

        Ok(Self { rx })
    }

    /// Wait up to `timeout` for the stream to reach end-of-stream.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<CapturedStream, CaptureError> {
        match self.rx.recv_timeout(timeout) {
            Ok(Ok(captured)) => Ok(captured),
            Ok(Err(e)) => Err(CaptureError::Failed(format!("read failed: {}", e))),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(CaptureError::TimedOut),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(CaptureError::Failed("capture thread panicked".to_string()))
            }
        }
    }
}
