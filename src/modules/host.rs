//! Host registry: dispatches applications, functions and manager actions
//! to the modules that registered them.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::channel::Channel;
use crate::error::{CommandErrorKind, ModuleError};
use crate::manager::{ManagerMessage, ManagerResponse};

use super::traits::{Application, Function, ManagerAction, Module};

/// Collects the entry points a module registers during `load()`.
#[derive(Default)]
pub struct Registrar {
    applications: Vec<Arc<dyn Application>>,
    functions: Vec<Arc<dyn Function>>,
    actions: Vec<Arc<dyn ManagerAction>>,
}

impl Registrar {
    pub fn application(&mut self, application: Arc<dyn Application>) {
        self.applications.push(application);
    }

    pub fn function(&mut self, function: Arc<dyn Function>) {
        self.functions.push(function);
    }

    pub fn action(&mut self, action: Arc<dyn ManagerAction>) {
        self.actions.push(action);
    }
}

/// What a loaded module registered.
struct LoadedModule {
    name: &'static str,
    applications: Vec<String>,
    functions: Vec<String>,
    actions: Vec<String>,
}

/// Registry of loaded modules and their entry points.
///
/// All names are matched case-insensitively.
#[derive(Default)]
pub struct Host {
    applications: HashMap<String, Arc<dyn Application>>,
    functions: HashMap<String, Arc<dyn Function>>,
    actions: HashMap<String, Arc<dyn ManagerAction>>,
    modules: Vec<LoadedModule>,
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

fn unknown(item: &'static str, name: &str) -> ModuleError {
    ModuleError::Command {
        kind: CommandErrorKind::Unknown {
            item,
            name: name.to_string(),
        },
    }
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a module, registering all of its entry points.
    ///
    /// Nothing is registered if the module is already loaded or any of its
    /// names is taken.
    pub fn load_module(&mut self, module: &dyn Module) -> Result<(), ModuleError> {
        let name = module.name();
        if self.is_loaded(name) {
            return Err(ModuleError::Registration {
                message: format!("Module '{}' is already loaded", name),
            });
        }

        let mut registrar = Registrar::default();
        module.load(&mut registrar)?;

        let conflict = registrar
            .applications
            .iter()
            .find(|a| self.applications.contains_key(&key(a.name())))
            .map(|a| format!("application '{}'", a.name()))
            .or_else(|| {
                registrar
                    .functions
                    .iter()
                    .find(|f| self.functions.contains_key(&key(f.name())))
                    .map(|f| format!("function '{}'", f.name()))
            })
            .or_else(|| {
                registrar
                    .actions
                    .iter()
                    .find(|a| self.actions.contains_key(&key(a.name())))
                    .map(|a| format!("manager action '{}'", a.name()))
            });
        if let Some(conflict) = conflict {
            return Err(ModuleError::Registration {
                message: format!("Module '{}': {} is already registered", name, conflict),
            });
        }

        let mut loaded = LoadedModule {
            name,
            applications: Vec::new(),
            functions: Vec::new(),
            actions: Vec::new(),
        };

        for application in registrar.applications {
            debug!(module = name, application = application.name(), "Registering application");
            loaded.applications.push(key(application.name()));
            self.applications.insert(key(application.name()), application);
        }
        for function in registrar.functions {
            debug!(module = name, function = function.name(), "Registering function");
            loaded.functions.push(key(function.name()));
            self.functions.insert(key(function.name()), function);
        }
        for action in registrar.actions {
            debug!(module = name, action = action.name(), "Registering manager action");
            loaded.actions.push(key(action.name()));
            self.actions.insert(key(action.name()), action);
        }

        info!(
            module = name,
            description = module.description(),
            applications = loaded.applications.len(),
            functions = loaded.functions.len(),
            actions = loaded.actions.len(),
            "Module loaded"
        );
        self.modules.push(loaded);
        Ok(())
    }

    /// Unload a module, removing everything it registered.
    pub fn unload_module(&mut self, name: &str) -> Result<(), ModuleError> {
        let index = self
            .modules
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| unknown("module", name))?;
        let loaded = self.modules.remove(index);

        for application in &loaded.applications {
            self.applications.remove(application);
        }
        for function in &loaded.functions {
            self.functions.remove(function);
        }
        for action in &loaded.actions {
            self.actions.remove(action);
        }

        info!(module = name, "Module unloaded");
        Ok(())
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m.name == name)
    }

    pub fn application(&self, name: &str) -> Option<Arc<dyn Application>> {
        self.applications.get(&key(name)).cloned()
    }

    pub fn function(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.functions.get(&key(name)).cloned()
    }

    pub fn action(&self, name: &str) -> Option<Arc<dyn ManagerAction>> {
        self.actions.get(&key(name)).cloned()
    }

    /// Run a dialplan application on `channel`.
    pub fn exec_application(
        &self,
        channel: &Channel,
        name: &str,
        data: Option<&str>,
    ) -> Result<(), ModuleError> {
        let application = self
            .application(name)
            .ok_or_else(|| unknown("application", name))?;
        debug!(channel = channel.name(), application = name, "Executing application");
        application.execute(channel, data)
    }

    /// Evaluate a dialplan function.
    pub fn read_function(
        &self,
        channel: Option<&Channel>,
        name: &str,
        data: &str,
    ) -> Result<String, ModuleError> {
        let function = self.function(name).ok_or_else(|| unknown("function", name))?;
        function.read(channel, data)
    }

    /// Dispatch a management request to its action.
    ///
    /// The request's ActionID is echoed on the response.
    pub fn dispatch_action(&self, message: &ManagerMessage) -> ManagerResponse {
        let action_id = message.action_id();

        let Some(name) = message.action_name() else {
            return ManagerResponse::error("Missing action in request").with_action_id(action_id);
        };

        let Some(action) = self.action(name) else {
            warn!(action = name, "Unknown manager action");
            return ManagerResponse::error("Invalid/unknown command").with_action_id(action_id);
        };

        let response = action.execute(message);
        if response.action_id.is_some() {
            response
        } else {
            response.with_action_id(action_id)
        }
    }

    pub fn list_applications(&self) -> Vec<&'static str> {
        self.applications.values().map(|a| a.name()).collect()
    }

    pub fn list_functions(&self) -> Vec<&'static str> {
        self.functions.values().map(|f| f.name()).collect()
    }

    pub fn list_actions(&self) -> Vec<&'static str> {
        self.actions.values().map(|a| a.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Application for Echo {
        fn name(&self) -> &'static str {
            "Echo"
        }
        fn synopsis(&self) -> &'static str {
            "Set ECHO to the data"
        }
        fn execute(&self, channel: &Channel, data: Option<&str>) -> Result<(), ModuleError> {
            channel.set_variable("ECHO", data.unwrap_or_default())
        }
    }

    impl Function for Echo {
        fn name(&self) -> &'static str {
            "ECHO"
        }
        fn synopsis(&self) -> &'static str {
            "Return the data"
        }
        fn syntax(&self) -> &'static str {
            "ECHO(<data>)"
        }
        fn read(&self, _channel: Option<&Channel>, data: &str) -> Result<String, ModuleError> {
            Ok(data.to_string())
        }
    }

    impl ManagerAction for Echo {
        fn name(&self) -> &'static str {
            "Echo"
        }
        fn synopsis(&self) -> &'static str {
            "Echo a header"
        }
        fn execute(&self, message: &ManagerMessage) -> ManagerResponse {
            ManagerResponse::output(message.header("Data").unwrap_or_default())
        }
    }

    struct EchoModule;

    impl Module for EchoModule {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn description(&self) -> &'static str {
            "Echo test module"
        }
        fn load(&self, registrar: &mut Registrar) -> Result<(), ModuleError> {
            let echo = Arc::new(Echo);
            registrar.application(echo.clone());
            registrar.function(echo.clone());
            registrar.action(echo);
            Ok(())
        }
    }

    #[test]
    fn test_load_registers_everything() {
        let mut host = Host::new();
        host.load_module(&EchoModule).unwrap();

        assert!(host.is_loaded("echo"));
        assert!(host.application("echo").is_some());
        assert!(host.function("Echo").is_some());
        assert!(host.action("ECHO").is_some());
        assert_eq!(host.list_applications(), vec!["Echo"]);
        assert_eq!(host.list_functions(), vec!["ECHO"]);
        assert_eq!(host.list_actions(), vec!["Echo"]);
    }

    #[test]
    fn test_double_load_rejected() {
        let mut host = Host::new();
        host.load_module(&EchoModule).unwrap();
        assert!(matches!(
            host.load_module(&EchoModule),
            Err(ModuleError::Registration { .. })
        ));
    }

    #[test]
    fn test_unload_removes_everything() {
        let mut host = Host::new();
        host.load_module(&EchoModule).unwrap();
        host.unload_module("echo").unwrap();

        assert!(!host.is_loaded("echo"));
        assert!(host.application("Echo").is_none());
        assert!(host.function("ECHO").is_none());
        assert!(host.action("Echo").is_none());
        assert!(host.unload_module("echo").is_err());
    }

    #[test]
    fn test_dispatch() {
        let mut host = Host::new();
        host.load_module(&EchoModule).unwrap();

        let channel = Channel::new("Local/test");
        host.exec_application(&channel, "ECHO", Some("hi")).unwrap();
        assert_eq!(channel.variable("ECHO").as_deref(), Some("hi"));

        assert_eq!(host.read_function(None, "echo", "x").unwrap(), "x");
        assert!(host.read_function(None, "MISSING", "x").is_err());

        let response = host.dispatch_action(
            &ManagerMessage::action("echo")
                .with_header("ActionID", "9")
                .with_header("Data", "pong"),
        );
        assert_eq!(response.output.as_deref(), Some("pong"));
        assert_eq!(response.action_id.as_deref(), Some("9"));
    }

    #[test]
    fn test_dispatch_unknown_action() {
        let host = Host::new();
        let response =
            host.dispatch_action(&ManagerMessage::action("Nope").with_header("ActionID", "1"));
        assert_eq!(response.message.as_deref(), Some("Invalid/unknown command"));
        assert_eq!(response.action_id.as_deref(), Some("1"));

        let response = host.dispatch_action(&ManagerMessage::new());
        assert_eq!(response.message.as_deref(), Some("Missing action in request"));
    }
}
