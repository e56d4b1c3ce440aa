//! `BackTicks` manager action.

use std::sync::Arc;

use tracing::{info, warn};

use crate::channel::ChannelRegistry;
use crate::error::{ChannelErrorKind, ModuleError, ValidationErrorKind};
use crate::executor::CommandRunner;
use crate::manager::{ManagerMessage, ManagerResponse};
use crate::modules::traits::ManagerAction;
use crate::modules::types::{ExecutionContext, Invocation};
use crate::validation::validate_variable_name;

const PAIR_REQUIRED: &str = "If you set Channel, you have to set Variable and viceversa";

/// Runs `Command` and returns its output; optionally stores it in
/// `Variable` on `Channel`.
///
/// # Headers
///
/// - `ActionID` (optional): echoed on the response
/// - `Command` (required): the command line
/// - `Channel`, `Variable` (optional, together): where to store the output
pub struct BackticksAction {
    runner: Arc<CommandRunner>,
    channels: Arc<dyn ChannelRegistry>,
}

impl BackticksAction {
    pub fn new(runner: Arc<CommandRunner>, channels: Arc<dyn ChannelRegistry>) -> Self {
        Self { runner, channels }
    }
}

/// Map a refused command to the message sent back to the requester.
fn refusal_message(error: &ModuleError) -> String {
    match error {
        ModuleError::Validation {
            kind:
                ValidationErrorKind::ProgramNotAllowed { .. }
                | ValidationErrorKind::ProgramNotAbsolute { .. },
        } => "Command not permitted".to_string(),
        ModuleError::Validation { kind } => kind.to_string(),
        ModuleError::Channel {
            kind: ChannelErrorKind::NotFound { .. },
        } => "No such channel".to_string(),
        other => other.to_string(),
    }
}

impl ManagerAction for BackticksAction {
    fn name(&self) -> &'static str {
        "BackTicks"
    }

    fn synopsis(&self) -> &'static str {
        "Execute a shell command and save the result as a variable."
    }

    fn description(&self) -> &'static str {
        "  Backticks(<VARNAME>,<command>)\n\nBe sure to include a full path!\n"
    }

    fn execute(&self, message: &ManagerMessage) -> ManagerResponse {
        let action_id = message.action_id();

        let Some(command) = message.header("Command") else {
            return ManagerResponse::error("Command not specified").with_action_id(action_id);
        };

        let target = match (message.header("Channel"), message.header("Variable")) {
            (Some(channel_name), Some(variable)) => {
                if let Err(e) = validate_variable_name(variable) {
                    return ManagerResponse::error(refusal_message(&e)).with_action_id(action_id);
                }
                match self.channels.get(channel_name) {
                    Ok(channel) => Some((channel, variable)),
                    Err(e) => {
                        warn!(error = %e, "BackTicks target channel lookup failed");
                        return ManagerResponse::error(refusal_message(&e))
                            .with_action_id(action_id);
                    }
                }
            }
            (None, None) => None,
            _ => return ManagerResponse::error(PAIR_REQUIRED).with_action_id(action_id),
        };

        let mut ctx = ExecutionContext::new(Invocation::Manager);
        if let Some((channel, _)) = &target {
            ctx = ctx.with_channel(channel.name());
        }

        let output = match self.runner.try_run(&ctx, command) {
            Ok(output) => output,
            Err(e) if e.is_validation() => {
                return ManagerResponse::error(refusal_message(&e)).with_action_id(action_id);
            }
            Err(e) => {
                warn!(request_id = %ctx.request_id, error = %e, "BackTicks command failed");
                return ManagerResponse::fail().with_action_id(action_id);
            }
        };

        let Some(text) = output.into_text() else {
            return ManagerResponse::fail().with_action_id(action_id);
        };

        if let Some((channel, variable)) = target {
            // Lock held for the assignment only
            let assigned = channel.lock().map(|mut guard| guard.set_variable(variable, &text));
            if let Err(e) = assigned {
                warn!(channel = channel.name(), error = %e, "Failed to set channel variable");
                return ManagerResponse::error(e.to_string()).with_action_id(action_id);
            }
            info!(
                request_id = %ctx.request_id,
                channel = channel.name(),
                variable = variable,
                "Channel variable set from command output"
            );
        }

        ManagerResponse::output(text).with_action_id(action_id)
    }
}
