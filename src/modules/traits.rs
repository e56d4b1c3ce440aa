//! Entry point traits.

use crate::channel::Channel;
use crate::error::ModuleError;
use crate::manager::{ManagerMessage, ManagerResponse};

use super::host::Registrar;

/// A dialplan application, invoked as `Name(data)` on a channel.
pub trait Application: Send + Sync {
    /// Name used in the dialplan (matched case-insensitively).
    fn name(&self) -> &'static str;

    /// One-line description.
    fn synopsis(&self) -> &'static str;

    /// Longer usage text.
    fn description(&self) -> &'static str {
        ""
    }

    /// Run on `channel`. An error tells the host the application failed.
    fn execute(&self, channel: &Channel, data: Option<&str>) -> Result<(), ModuleError>;
}

/// A dialplan function, evaluated as `${NAME(data)}`.
pub trait Function: Send + Sync {
    fn name(&self) -> &'static str;

    fn synopsis(&self) -> &'static str;

    /// Call syntax, e.g. `NAME(<arg>)`.
    fn syntax(&self) -> &'static str;

    /// Evaluate the function. An error means "no value".
    fn read(&self, channel: Option<&Channel>, data: &str) -> Result<String, ModuleError>;
}

/// A management action.
///
/// Unlike applications, actions report every outcome, including
/// validation failures, as a response to the requester.
pub trait ManagerAction: Send + Sync {
    /// The `Action:` header value (matched case-insensitively).
    fn name(&self) -> &'static str;

    fn synopsis(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    /// Handle a request. The response need not carry the ActionID; the
    /// host adds it.
    fn execute(&self, message: &ManagerMessage) -> ManagerResponse;
}

/// A loadable module.
pub trait Module: Send + Sync {
    /// Unique module name.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Register the module's entry points.
    ///
    /// Everything registered here is removed again on unload.
    fn load(&self, registrar: &mut Registrar) -> Result<(), ModuleError>;
}
