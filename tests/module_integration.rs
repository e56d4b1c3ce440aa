//! Integration tests for the BackTicks and DeleteConfig modules.
//!
//! These tests load both modules into a host the way the platform would and
//! drive them through the application, function and manager entry points.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;

use pbx_backticks::audit::AuditLogger;
use pbx_backticks::channel::{Channel, ChannelRegistry, InMemoryChannels};
use pbx_backticks::config::Settings;
use pbx_backticks::executor::CommandRunner;
use pbx_backticks::manager::{ManagerMessage, ResponseKind};
use pbx_backticks::modules::backticks::BackticksModule;
use pbx_backticks::modules::deleteconfig::{DeleteConfigModule, DELETED_MESSAGE};
use pbx_backticks::modules::Host;

/// Test host instance with both modules loaded.
struct TestHost {
    host: Host,
    channels: Arc<InMemoryChannels>,
    config_dir: PathBuf,
    audit_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestHost {
    fn start() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_dir = temp_dir.path().join("asterisk");
        fs::create_dir(&config_dir).expect("Failed to create config directory");
        let audit_path = temp_dir.path().join("log").join("audit.log");

        let settings = Settings::from_toml(&format!(
            r#"
            [executor]
            timeout_seconds = 2
            allowed_programs = ["/bin/echo", "/bin/sh"]

            [paths]
            config_dir = "{}"

            [audit]
            enabled = true
            log_path = "{}"
            "#,
            config_dir.display(),
            audit_path.display()
        ))
        .expect("Failed to parse settings");

        let audit = Arc::new(
            AuditLogger::new(&settings.audit.log_path).expect("Failed to open audit log"),
        );
        let runner = CommandRunner::from_settings(&settings).with_audit(Arc::clone(&audit));
        let channels = Arc::new(InMemoryChannels::new());

        let mut host = Host::new();
        host.load_module(&BackticksModule::new(
            Arc::new(runner),
            Arc::clone(&channels) as Arc<dyn ChannelRegistry>,
        ))
        .expect("Failed to load backticks");
        host.load_module(
            &DeleteConfigModule::new(settings.paths.config_dir.clone()).with_audit(audit),
        )
        .expect("Failed to load deleteconfig");

        Self {
            host,
            channels,
            config_dir,
            audit_path,
            _temp_dir: temp_dir,
        }
    }

    fn channel(&self, name: &str) -> Arc<Channel> {
        self.channels.create(name)
    }

    fn audit_entries(&self) -> Vec<Value> {
        fs::read_to_string(&self.audit_path)
            .expect("Failed to read audit log")
            .lines()
            .map(|line| serde_json::from_str(line).expect("Invalid audit line"))
            .collect()
    }
}

#[test]
fn test_modules_register_their_items() {
    let host = TestHost::start();

    assert!(host.host.is_loaded("backticks"));
    assert!(host.host.is_loaded("deleteconfig"));
    assert!(host.host.application("backticks").is_some());
    assert!(host.host.function("BACKTICKS").is_some());
    assert!(host.host.action("BackTicks").is_some());
    assert!(host.host.action("DeleteConfig").is_some());
}

#[test]
fn test_manager_action_sets_channel_variable() {
    let host = TestHost::start();
    let channel = host.channel("SIP/100-00000001");

    let message = ManagerMessage::parse(
        "Action: BackTicks\r\nActionID: 7\r\nCommand: /bin/echo -n 42\r\n\
         Channel: SIP/100-00000001\r\nVariable: X\r\n\r\n",
    )
    .expect("Failed to parse message");
    let response = host.host.dispatch_action(&message);

    assert_eq!(response.kind, ResponseKind::Success);
    assert_eq!(response.action_id.as_deref(), Some("7"));
    assert_eq!(response.output.as_deref(), Some("42"));
    assert_eq!(channel.variable("X").as_deref(), Some("42"));

    let wire = response.to_wire();
    assert!(wire.starts_with("Response: Success\r\nActionID: 7\r\n"));
    assert!(wire.ends_with("\r\n\r\n"));
}

#[test]
fn test_manager_action_pair_validation() {
    let host = TestHost::start();
    host.channel("SIP/100-00000001");

    let message = ManagerMessage::action("BackTicks")
        .with_header("Command", "/bin/echo hi")
        .with_header("Channel", "SIP/100-00000001");
    let response = host.host.dispatch_action(&message);

    assert_eq!(response.kind, ResponseKind::Error);
    assert_eq!(
        response.message.as_deref(),
        Some("If you set Channel, you have to set Variable and viceversa")
    );
    // Nothing ran, so nothing was audited.
    assert!(host.audit_entries().is_empty());
}

#[test]
fn test_manager_action_refuses_unlisted_program() {
    let host = TestHost::start();

    let message = ManagerMessage::action("BackTicks").with_header("Command", "/bin/date");
    let response = host.host.dispatch_action(&message);

    assert_eq!(response.kind, ResponseKind::Error);
    assert_eq!(response.message.as_deref(), Some("Command not permitted"));

    let entries = host.audit_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["source"], "manager");
    assert_eq!(entries[0]["result"]["status"], "failure");
}

#[test]
fn test_application_sets_variable() {
    let host = TestHost::start();
    let channel = host.channel("Local/test");

    host.host
        .exec_application(&channel, "BackTicks", Some("GREETING,/bin/echo -n hello, world"))
        .expect("Application failed");

    assert_eq!(channel.variable("GREETING").as_deref(), Some("hello, world"));

    let entries = host.audit_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["source"], "application");
    assert_eq!(entries[0]["operation"], "exec");
    assert_eq!(entries[0]["subject"]["program"], "/bin/echo");
    assert_eq!(entries[0]["result"]["data"]["bytes"], 12);
}

#[test]
fn test_application_usage_error() {
    let host = TestHost::start();
    let channel = host.channel("Local/test");

    let err = host
        .host
        .exec_application(&channel, "BackTicks", Some("ONLYVAR"))
        .unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().ends_with("Usage: Backticks(<VARNAME>,<command>)"));
    assert!(channel.variable("ONLYVAR").is_none());
}

#[test]
fn test_function_returns_output() {
    let host = TestHost::start();

    let value = host
        .host
        .read_function(None, "BACKTICKS", "/bin/echo -n ok")
        .expect("Function failed");
    assert_eq!(value, "ok");
}

#[test]
fn test_function_empty_output_fails() {
    let host = TestHost::start();

    let result = host.host.read_function(None, "BACKTICKS", "/bin/echo -n");
    assert!(result.is_err());
}

#[test]
fn test_delete_config_removes_file() {
    let host = TestHost::start();
    let target = host.config_dir.join("extensions_custom.conf");
    fs::write(&target, "[default]\n").unwrap();

    let message = ManagerMessage::action("DeleteConfig")
        .with_header("ActionID", "del-1")
        .with_header("Filename", "extensions_custom.conf");
    let response = host.host.dispatch_action(&message);

    assert_eq!(response.kind, ResponseKind::Success);
    assert_eq!(response.message.as_deref(), Some(DELETED_MESSAGE));
    assert_eq!(response.action_id.as_deref(), Some("del-1"));
    assert!(!target.exists());

    let entries = host.audit_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["operation"], "delete_config");
    assert_eq!(entries[0]["result"]["status"], "success");
}

#[test]
fn test_delete_config_missing_file_is_error() {
    let host = TestHost::start();

    let message = ManagerMessage::action("DeleteConfig").with_header("Filename", "absent.conf");
    let response = host.host.dispatch_action(&message);

    assert_eq!(response.kind, ResponseKind::Error);
    assert_eq!(response.message.as_deref(), Some("No such file or directory"));
}

#[test]
fn test_delete_config_refuses_escape() {
    let host = TestHost::start();
    let outside = host.config_dir.parent().unwrap().join("outside.conf");
    fs::write(&outside, "keep").unwrap();

    let message = ManagerMessage::action("DeleteConfig").with_header("Filename", "../outside.conf");
    let response = host.host.dispatch_action(&message);

    assert_eq!(response.kind, ResponseKind::Error);
    assert!(outside.exists());
}

#[test]
fn test_unknown_action() {
    let host = TestHost::start();

    let response = host
        .host
        .dispatch_action(&ManagerMessage::action("Originate").with_header("ActionID", "9"));
    assert_eq!(response.kind, ResponseKind::Error);
    assert_eq!(response.message.as_deref(), Some("Invalid/unknown command"));
    assert_eq!(response.action_id.as_deref(), Some("9"));
}

#[test]
fn test_unload_removes_items() {
    let mut host = TestHost::start();

    host.host.unload_module("backticks").expect("Failed to unload");

    assert!(!host.host.is_loaded("backticks"));
    assert!(host.host.application("BackTicks").is_none());
    assert!(host.host.function("BACKTICKS").is_none());
    assert!(host.host.action("BackTicks").is_none());
    assert!(host.host.action("DeleteConfig").is_some());
}
