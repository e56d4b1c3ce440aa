//! Command runner: the entry point shared by the application, the function
//! and the manager action.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::audit::{AuditEntry, AuditLogger};
use crate::config::Settings;
use crate::error::ModuleError;
use crate::modules::{ExecutionContext, Invocation};
use crate::validation::ProgramAllowlist;

use super::command_line::CommandLine;
use super::output::CommandOutput;
use super::subprocess::SubprocessBuilder;

/// Runs command lines under the configured policy.
///
/// Holds no per-call state; one runner serves every invocation.
pub struct CommandRunner {
    allowlist: ProgramAllowlist,
    timeout: Duration,
    max_output_bytes: usize,
    clear_env: bool,
    env: HashMap<String, String>,
    audit: Option<Arc<AuditLogger>>,
}

impl CommandRunner {
    /// Runner with default limits (10 s, 1024 bytes) and the given allow-list.
    pub fn new(allowlist: ProgramAllowlist) -> Self {
        Self {
            allowlist,
            timeout: Duration::from_secs(10),
            max_output_bytes: 1024,
            clear_env: false,
            env: HashMap::new(),
            audit: None,
        }
    }

    /// Runner configured from `[executor]`.
    pub fn from_settings(settings: &Settings) -> Self {
        let executor = &settings.executor;
        Self {
            allowlist: ProgramAllowlist::from_config(executor),
            timeout: executor.timeout(),
            max_output_bytes: executor.max_output_bytes,
            clear_env: executor.clear_env,
            env: executor.env.clone(),
            audit: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn max_output_bytes(&self) -> usize {
        self.max_output_bytes
    }

    /// Split `line` and check the program against the allow-list.
    pub fn prepare(&self, line: &str) -> Result<CommandLine, ModuleError> {
        let command = CommandLine::parse(line)?;
        self.allowlist.check(command.program())?;
        Ok(command)
    }

    /// Run `line`, returning an empty buffer on any failure.
    pub fn run(&self, line: &str) -> CommandOutput {
        self.run_in(&ExecutionContext::new(Invocation::Direct), line)
    }

    /// Like [`run`](Self::run), attributed to `ctx`.
    pub fn run_in(&self, ctx: &ExecutionContext, line: &str) -> CommandOutput {
        match self.try_run(ctx, line) {
            Ok(output) => output,
            Err(e) => {
                warn!(request_id = %ctx.request_id, error = %e, "Command failed");
                CommandOutput::empty(self.max_output_bytes)
            }
        }
    }

    /// Split, authorize and execute `line`.
    pub fn try_run(&self, ctx: &ExecutionContext, line: &str) -> Result<CommandOutput, ModuleError> {
        let command = match self.prepare(line) {
            Ok(command) => command,
            Err(e) => {
                self.audit_failure(ctx, serde_json::json!({ "command_line": line }), &e);
                return Err(e);
            }
        };
        self.execute(ctx, &command)
    }

    /// Execute an already split command line after checking the allow-list.
    pub fn execute(
        &self,
        ctx: &ExecutionContext,
        command: &CommandLine,
    ) -> Result<CommandOutput, ModuleError> {
        let subject = serde_json::json!({
            "program": command.program(),
            "args": command.args(),
        });

        if let Err(e) = self.allowlist.check(command.program()) {
            self.audit_failure(ctx, subject, &e);
            return Err(e);
        }

        info!(
            request_id = %ctx.request_id,
            source = %ctx.source,
            program = %command.program(),
            "Running command"
        );

        let mut builder = SubprocessBuilder::from_command_line(command)
            .timeout(self.timeout)
            .max_output_bytes(self.max_output_bytes);
        if self.clear_env {
            builder = builder.clear_env();
        }
        for (key, value) in &self.env {
            builder = builder.env(key, value);
        }

        match builder.run() {
            Ok(output) => {
                if let Some(audit) = &self.audit {
                    audit.record(&AuditEntry::success(
                        ctx,
                        "exec",
                        subject,
                        Some(serde_json::json!({
                            "bytes": output.len(),
                            "truncated": output.truncated(),
                            "exit_code": output.exit_code(),
                        })),
                    ));
                }
                Ok(output)
            }
            Err(e) => {
                self.audit_failure(ctx, subject, &e);
                Err(e)
            }
        }
    }

    fn audit_failure(&self, ctx: &ExecutionContext, subject: serde_json::Value, error: &ModuleError) {
        if let Some(audit) = &self.audit {
            audit.record(&AuditEntry::failure(
                ctx,
                "exec",
                subject,
                error.code(),
                error.to_string(),
            ));
        }
    }
}
