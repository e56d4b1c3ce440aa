//! Management request messages.

use crate::error::{ModuleError, ValidationErrorKind};

/// A management request: an ordered list of headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerMessage {
    headers: Vec<(String, String)>,
}

impl ManagerMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a message for the given action.
    pub fn action(name: &str) -> Self {
        Self::new().with_header("Action", name)
    }

    /// Add a header (builder pattern).
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    /// Parse `Key: Value` lines. Parsing stops at the first empty line.
    pub fn parse(text: &str) -> Result<Self, ModuleError> {
        let mut message = Self::new();

        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                break;
            }
            let (name, value) = line.split_once(':').ok_or_else(|| ModuleError::Validation {
                kind: ValidationErrorKind::InvalidParameter {
                    param: "header".to_string(),
                    message: format!("missing ':' in '{}'", line),
                },
            })?;
            message.push(name.trim(), value.trim_start());
        }

        Ok(message)
    }

    /// Parse a `Key: Value` argument as given on a command line.
    pub fn parse_header(arg: &str) -> Option<(String, String)> {
        let (name, value) = arg.split_once(':')?;
        Some((name.trim().to_string(), value.trim_start().to_string()))
    }

    /// First header named `name` (case-insensitive). Empty values count as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// The `Action` header.
    pub fn action_name(&self) -> Option<&str> {
        self.header("Action")
    }

    /// The `ActionID` header.
    pub fn action_id(&self) -> Option<&str> {
        self.header("ActionID")
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let message = ManagerMessage::action("BackTicks")
            .with_header("actionid", "7")
            .with_header("COMMAND", "/bin/date");

        assert_eq!(message.action_name(), Some("BackTicks"));
        assert_eq!(message.action_id(), Some("7"));
        assert_eq!(message.header("Command"), Some("/bin/date"));
        assert_eq!(message.header("Channel"), None);
    }

    #[test]
    fn test_empty_value_is_absent() {
        let message = ManagerMessage::action("BackTicks").with_header("Channel", "");
        assert_eq!(message.header("Channel"), None);
    }

    #[test]
    fn test_parse_wire_block() {
        let message = ManagerMessage::parse(
            "Action: BackTicks\r\nActionID: abc\r\nCommand: /bin/echo a: b\r\n\r\nIgnored: yes\r\n",
        )
        .unwrap();

        assert_eq!(message.action_name(), Some("BackTicks"));
        assert_eq!(message.action_id(), Some("abc"));
        assert_eq!(message.header("Command"), Some("/bin/echo a: b"));
        assert_eq!(message.header("Ignored"), None);
        assert_eq!(message.headers().count(), 3);
    }

    #[test]
    fn test_parse_rejects_malformed_line() {
        assert!(ManagerMessage::parse("Action BackTicks\r\n").is_err());
    }

    #[test]
    fn test_parse_header_argument() {
        assert_eq!(
            ManagerMessage::parse_header("Filename: sip.conf"),
            Some(("Filename".to_string(), "sip.conf".to_string()))
        );
        assert_eq!(ManagerMessage::parse_header("novalue"), None);
    }
}
