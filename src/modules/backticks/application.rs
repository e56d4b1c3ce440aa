//! `BackTicks(<VARNAME>,<command>)` dialplan application.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::channel::Channel;
use crate::error::{CommandErrorKind, ModuleError, ValidationErrorKind};
use crate::executor::CommandRunner;
use crate::modules::traits::Application;
use crate::modules::types::{ExecutionContext, Invocation};
use crate::validation::validate_variable_name;

/// Usage text reported on malformed arguments.
pub const USAGE: &str = "Usage: Backticks(<VARNAME>,<command>)";

fn usage_error() -> ModuleError {
    warn!("{}", USAGE);
    ModuleError::Validation {
        kind: ValidationErrorKind::Usage {
            usage: USAGE.to_string(),
        },
    }
}

/// Split application data into variable name and command line.
///
/// The split happens at the first comma; later commas belong to the
/// command. Both fields must be non-empty.
pub fn parse_arguments(data: &str) -> Result<(&str, &str), ModuleError> {
    let (variable, command) = data.split_once(',').ok_or_else(usage_error)?;
    let variable = variable.trim();
    if variable.is_empty() || command.trim().is_empty() {
        return Err(usage_error());
    }
    Ok((variable, command))
}

/// Sets a channel variable to a command's output.
pub struct BackticksApplication {
    runner: Arc<CommandRunner>,
}

impl BackticksApplication {
    pub fn new(runner: Arc<CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Application for BackticksApplication {
    fn name(&self) -> &'static str {
        "BackTicks"
    }

    fn synopsis(&self) -> &'static str {
        "Execute a shell command and save the result as a variable."
    }

    fn description(&self) -> &'static str {
        "  Backticks(<VARNAME>,<command>)\n\nBe sure to include a full path!\n"
    }

    fn execute(&self, channel: &Channel, data: Option<&str>) -> Result<(), ModuleError> {
        let data = data.filter(|d| !d.is_empty()).ok_or_else(usage_error)?;
        let (variable, command) = parse_arguments(data)?;
        validate_variable_name(variable)?;

        let ctx = ExecutionContext::new(Invocation::Application).with_channel(channel.name());
        let output = self.runner.try_run(&ctx, command)?;

        let Some(text) = output.into_text() else {
            warn!(channel = channel.name(), "No Data!");
            return Err(ModuleError::Command {
                kind: CommandErrorKind::NoOutput,
            });
        };

        channel.set_variable(variable, &text)?;
        debug!(
            request_id = %ctx.request_id,
            channel = channel.name(),
            variable = variable,
            bytes = text.len(),
            "Variable set from command output"
        );
        Ok(())
    }
}
