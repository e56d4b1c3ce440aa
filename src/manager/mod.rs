//! Management interface types.
//!
//! Requests and responses are blocks of `Key: Value` lines terminated by an
//! empty line:
//! ```text
//! Action: BackTicks\r\n
//! ActionID: 42\r\n
//! Command: /bin/date\r\n
//! \r\n
//! ```
//! Transport and session handling belong to the host platform.

mod message;
mod response;

pub use message::ManagerMessage;
pub use response::{ManagerResponse, ResponseKind};
