//! Subprocess execution with bounded capture.
//!
//! Runs a program directly (no shell) with:
//! - stdout captured into a fixed-capacity buffer
//! - stderr captured separately and logged
//! - a timeout that kills the child's whole process group
//! - the child always reaped before returning

use std::collections::HashMap;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::error::{CommandErrorKind, ModuleError};

use super::capture::{CaptureError, StreamReader};
use super::command_line::CommandLine;
use super::output::CommandOutput;

/// How often the child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Stderr is only logged, so keep little of it.
const STDERR_CAPTURE_BYTES: usize = 4096;

/// How long to wait for stderr once stdout is complete.
const STDERR_GRACE: Duration = Duration::from_millis(100);

/// Builder for subprocess execution.
pub struct SubprocessBuilder {
    program: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    timeout: Duration,
    max_output_bytes: usize,
    clear_env: bool,
}

impl SubprocessBuilder {
    /// Create a new subprocess builder.
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            env: HashMap::new(),
            timeout: Duration::from_secs(10),
            max_output_bytes: 1024,
            clear_env: false,
        }
    }

    /// Create a builder from a split command line.
    pub fn from_command_line(command: &CommandLine) -> Self {
        Self::new(command.program()).args(command.args())
    }

    /// Add arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args.extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Set the timeout for the command.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the stdout buffer capacity.
    pub fn max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    /// Clear the environment before running (then add only specified env vars).
    pub fn clear_env(mut self) -> Self {
        self.clear_env = true;
        self
    }

    fn failed(&self, message: String) -> ModuleError {
        ModuleError::Command {
            kind: CommandErrorKind::ExecutionFailed {
                message: format!("{}: {}", self.program, message),
            },
        }
    }

    fn timed_out(&self) -> ModuleError {
        ModuleError::Command {
            kind: CommandErrorKind::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            },
        }
    }

    /// Execute the command, capture stdout and wait for the child.
    ///
    /// A non-zero exit status is not an error: the output is returned as
    /// captured and the status recorded in it.
    pub fn run(self) -> Result<CommandOutput, ModuleError> {
        debug!(
            program = %self.program,
            args = ?self.args,
            timeout_ms = self.timeout.as_millis() as u64,
            max_output_bytes = self.max_output_bytes,
            "Executing subprocess"
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        // Own process group, so a timeout can take down grandchildren too
        cmd.process_group(0);

        if self.clear_env {
            cmd.env_clear();
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let start = Instant::now();
        let deadline = start + self.timeout;

        let mut child = cmd
            .spawn()
            .map_err(|e| self.failed(format!("failed to spawn: {}", e)))?;

        let readers = match self.start_readers(&mut child) {
            Ok(readers) => readers,
            Err(e) => {
                terminate(&mut child);
                return Err(e);
            }
        };
        let (stdout_reader, stderr_reader) = readers;

        // Poll for completion with timeout enforcement
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        warn!(
                            program = %self.program,
                            timeout_ms = self.timeout.as_millis() as u64,
                            "Process timed out, killing"
                        );
                        terminate(&mut child);
                        return Err(self.timed_out());
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    terminate(&mut child);
                    return Err(self.failed(format!("failed to check process status: {}", e)));
                }
            }
        };

        // The child is reaped, but its own children may still hold the pipe
        let remaining = deadline.saturating_duration_since(Instant::now());
        let captured = match stdout_reader.recv_timeout(remaining) {
            Ok(captured) => captured,
            Err(CaptureError::TimedOut) => {
                warn!(
                    program = %self.program,
                    "Output still open after exit, killing process group"
                );
                kill_group(child.id());
                return Err(self.timed_out());
            }
            Err(CaptureError::Failed(message)) => return Err(self.failed(message)),
        };

        match stderr_reader.recv_timeout(STDERR_GRACE) {
            Ok(stderr) if !stderr.bytes.is_empty() => debug!(
                program = %self.program,
                stderr = %String::from_utf8_lossy(&stderr.bytes).trim_end(),
                "Subprocess wrote to stderr"
            ),
            Ok(_) => {}
            Err(_) => debug!(program = %self.program, "Stderr not collected"),
        }

        let output = CommandOutput::from_captured(
            self.max_output_bytes,
            &captured.bytes,
            captured.truncated,
            status.code(),
            start.elapsed(),
        );

        debug!(
            exit_code = ?output.exit_code(),
            bytes = output.len(),
            truncated = output.truncated(),
            duration_ms = output.duration().as_millis() as u64,
            "Subprocess completed"
        );

        Ok(output)
    }

    fn start_readers(&self, child: &mut Child) -> Result<(StreamReader, StreamReader), ModuleError> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| self.failed("stdout pipe unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| self.failed("stderr pipe unavailable".to_string()))?;

        let stdout_reader = StreamReader::spawn(stdout, self.max_output_bytes, "stdout")
            .map_err(|e| self.failed(format!("failed to start stdout reader: {}", e)))?;
        let stderr_reader = StreamReader::spawn(stderr, STDERR_CAPTURE_BYTES, "stderr")
            .map_err(|e| self.failed(format!("failed to start stderr reader: {}", e)))?;

        Ok((stdout_reader, stderr_reader))
    }
}

/// Kill every process in the child's process group.
fn kill_group(pid: u32) {
    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!(pid, error = %e, "Failed to kill process group"),
    }
}

/// Kill the child and its group, then reap it.
fn terminate(child: &mut Child) {
    kill_group(child.id());
    if let Err(e) = child.kill() {
        debug!(error = %e, "Child already gone");
    }
    if let Err(e) = child.wait() {
        warn!(error = %e, "Failed to reap child process");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_echo() {
        let output = SubprocessBuilder::new("/bin/echo")
            .args(["hello", "world"])
            .timeout(Duration::from_secs(5))
            .run()
            .unwrap();
        assert_eq!(output.exit_code(), Some(0));
        assert_eq!(output.text(), "hello world\n");
        assert_eq!(output.capacity(), 1024);
        assert!(output.buffer()[12..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_non_zero_exit_still_returns_output() {
        let output = SubprocessBuilder::new("/bin/sh")
            .args(["-c", "echo partial; exit 3"])
            .run()
            .unwrap();
        assert_eq!(output.exit_code(), Some(3));
        assert_eq!(output.text(), "partial\n");
    }

    #[test]
    fn test_no_output() {
        let output = SubprocessBuilder::new("/bin/sh")
            .args(["-c", "exit 0"])
            .run()
            .unwrap();
        assert!(output.is_empty());
        assert_eq!(output.buffer(), vec![0u8; 1024].as_slice());
    }

    #[test]
    fn test_output_truncated_to_capacity() {
        let output = SubprocessBuilder::new("/bin/sh")
            .args(["-c", "i=0; while [ $i -lt 2000 ]; do printf x; i=$((i+1)); done"])
            .max_output_bytes(64)
            .run()
            .unwrap();
        assert_eq!(output.len(), 64);
        assert!(output.truncated());
        assert_eq!(output.text(), "x".repeat(64));
    }

    #[test]
    fn test_large_output_does_not_block_child() {
        // Far more than a pipe buffer holds
        let output = SubprocessBuilder::new("/bin/sh")
            .args(["-c", "head -c 1000000 /dev/zero | tr '\\0' y"])
            .max_output_bytes(16)
            .timeout(Duration::from_secs(10))
            .run()
            .unwrap();
        assert_eq!(output.exit_code(), Some(0));
        assert!(output.truncated());
    }

    #[test]
    fn test_run_with_env() {
        let output = SubprocessBuilder::new("/bin/sh")
            .args(["-c", "echo $TEST_VAR"])
            .env("TEST_VAR", "hello_env")
            .run()
            .unwrap();
        assert_eq!(output.text().trim(), "hello_env");
    }

    #[test]
    fn test_clear_env() {
        std::env::set_var("BACKTICKS_PARENT_ONLY", "leak");
        let output = SubprocessBuilder::new("/bin/sh")
            .args(["-c", "echo \"[$BACKTICKS_PARENT_ONLY]\""])
            .clear_env()
            .run()
            .unwrap();
        assert_eq!(output.text().trim(), "[]");
    }

    #[test]
    fn test_nonexistent_program() {
        let result = SubprocessBuilder::new("/nonexistent/program_12345").run();
        assert!(matches!(
            result,
            Err(ModuleError::Command {
                kind: CommandErrorKind::ExecutionFailed { .. }
            })
        ));
    }

    #[test]
    fn test_timeout_kills_child() {
        let start = Instant::now();
        let result = SubprocessBuilder::new("/bin/sleep")
            .arg("5")
            .timeout(Duration::from_millis(300))
            .run();
        assert!(matches!(
            result,
            Err(ModuleError::Command {
                kind: CommandErrorKind::Timeout { timeout_ms: 300 }
            })
        ));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_sub_second_timeout_message() {
        let err = SubprocessBuilder::new("/bin/sleep")
            .arg("5")
            .timeout(Duration::from_millis(200))
            .run()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Command error: Command timed out after 200 ms"
        );
    }

    #[test]
    fn test_background_holder_of_stdout_is_killed() {
        let start = Instant::now();
        let result = SubprocessBuilder::new("/bin/sh")
            .args(["-c", "sleep 5 & echo started"])
            .timeout(Duration::from_millis(500))
            .run();
        assert!(matches!(
            result,
            Err(ModuleError::Command {
                kind: CommandErrorKind::Timeout { .. }
            })
        ));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_stderr_is_not_captured_as_output() {
        let output = SubprocessBuilder::new("/bin/sh")
            .args(["-c", "echo error >&2"])
            .run()
            .unwrap();
        assert!(output.is_empty());
    }
}
