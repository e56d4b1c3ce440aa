//! Loadable modules and the host they register with.
//!
//! ## Adding a New Module
//!
//! 1. Implement `Application`, `Function` and/or `ManagerAction` for the
//!    entry points
//! 2. Implement `Module`, registering them in `load()`
//! 3. Load it with `Host::load_module()`

mod host;
mod traits;
mod types;

pub mod backticks;
pub mod deleteconfig;

pub use host::{Host, Registrar};
pub use traits::{Application, Function, ManagerAction, Module};
pub use types::{ExecutionContext, Invocation};
