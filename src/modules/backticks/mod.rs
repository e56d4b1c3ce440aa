//! BackTicks module.
//!
//! Runs a command line and exposes its output:
//! - `BackTicks(<VARNAME>,<command>)` application sets a channel variable
//! - `BACKTICKS(<command>)` function evaluates to the output
//! - `BackTicks` manager action returns the output and can set a variable
//!   on a named channel

mod action;
mod application;
mod function;

use std::sync::Arc;

use crate::channel::ChannelRegistry;
use crate::error::ModuleError;
use crate::executor::CommandRunner;

use super::host::Registrar;
use super::traits::Module;

pub use action::BackticksAction;
pub use application::{parse_arguments, BackticksApplication, USAGE};
pub use function::BackticksFunction;

/// The BackTicks module.
pub struct BackticksModule {
    runner: Arc<CommandRunner>,
    channels: Arc<dyn ChannelRegistry>,
}

impl BackticksModule {
    pub fn new(runner: Arc<CommandRunner>, channels: Arc<dyn ChannelRegistry>) -> Self {
        Self { runner, channels }
    }
}

impl Module for BackticksModule {
    fn name(&self) -> &'static str {
        "backticks"
    }

    fn description(&self) -> &'static str {
        "BackTicks Application. Execute shell command and save output into variable"
    }

    fn load(&self, registrar: &mut Registrar) -> Result<(), ModuleError> {
        registrar.function(Arc::new(BackticksFunction::new(Arc::clone(&self.runner))));
        registrar.application(Arc::new(BackticksApplication::new(Arc::clone(&self.runner))));
        registrar.action(Arc::new(BackticksAction::new(
            Arc::clone(&self.runner),
            Arc::clone(&self.channels),
        )));
        Ok(())
    }
}
