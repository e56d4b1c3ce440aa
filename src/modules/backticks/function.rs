//! `BACKTICKS(<command>)` dialplan function.

use std::sync::Arc;

use tracing::warn;

use crate::channel::Channel;
use crate::error::{CommandErrorKind, ModuleError};
use crate::executor::CommandRunner;
use crate::modules::traits::Function;
use crate::modules::types::{ExecutionContext, Invocation};

/// Evaluates to a command's output.
pub struct BackticksFunction {
    runner: Arc<CommandRunner>,
}

impl BackticksFunction {
    pub fn new(runner: Arc<CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Function for BackticksFunction {
    fn name(&self) -> &'static str {
        "BACKTICKS"
    }

    fn synopsis(&self) -> &'static str {
        "Executes a shell command and evaluates to the result."
    }

    fn syntax(&self) -> &'static str {
        "BACKTICKS(<command>)"
    }

    fn read(&self, channel: Option<&Channel>, data: &str) -> Result<String, ModuleError> {
        let mut ctx = ExecutionContext::new(Invocation::Function);
        if let Some(channel) = channel {
            ctx = ctx.with_channel(channel.name());
        }

        self.runner.try_run(&ctx, data)?.into_text().ok_or_else(|| {
            warn!(request_id = %ctx.request_id, "BACKTICKS produced no output");
            ModuleError::Command {
                kind: CommandErrorKind::NoOutput,
            }
        })
    }
}
