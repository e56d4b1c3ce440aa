//! Audit entry types.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::modules::{ExecutionContext, Invocation};

/// A single audit log entry.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    /// RFC 3339 timestamp when the entry was written.
    pub timestamp: String,
    /// Unique identifier for the invocation.
    pub request_id: Uuid,
    /// Which entry point triggered the operation.
    pub source: Invocation,
    /// Channel the invocation belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// The operation performed ("exec", "delete_config").
    pub operation: String,
    /// What the operation acted on (program and args, or file name).
    pub subject: serde_json::Value,
    /// Outcome of the operation.
    pub result: AuditResult,
    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl AuditEntry {
    fn new(
        ctx: &ExecutionContext,
        operation: &str,
        subject: serde_json::Value,
        result: AuditResult,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            request_id: ctx.request_id,
            source: ctx.source,
            channel: ctx.channel.clone(),
            operation: operation.to_string(),
            subject,
            result,
            duration_ms: ctx.started.elapsed().as_millis() as u64,
        }
    }

    /// Entry for a successful operation.
    pub fn success(
        ctx: &ExecutionContext,
        operation: &str,
        subject: serde_json::Value,
        data: Option<serde_json::Value>,
    ) -> Self {
        Self::new(ctx, operation, subject, AuditResult::Success { data })
    }

    /// Entry for a failed or refused operation.
    pub fn failure(
        ctx: &ExecutionContext,
        operation: &str,
        subject: serde_json::Value,
        error_code: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self::new(
            ctx,
            operation,
            subject,
            AuditResult::Failure {
                error_code: error_code.into(),
                error_message: error_message.into(),
            },
        )
    }
}

/// Result of an operation for audit purposes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status")]
pub enum AuditResult {
    #[serde(rename = "success")]
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<serde_json::Value>,
    },
    #[serde(rename = "failure")]
    Failure {
        error_code: String,
        error_message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_serialization() {
        let ctx = ExecutionContext::new(Invocation::Manager).with_channel("SIP/100-0001");
        let entry = AuditEntry::success(
            &ctx,
            "exec",
            serde_json::json!({"program": "/bin/date", "args": []}),
            Some(serde_json::json!({"bytes": 29})),
        );

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"status\":\"success\""));
        assert!(json.contains("\"source\":\"manager\""));
        assert!(json.contains("\"channel\":\"SIP/100-0001\""));
        assert!(json.contains("\"operation\":\"exec\""));
        assert!(json.contains("\"bytes\":29"));
    }

    #[test]
    fn test_failure_serialization() {
        let ctx = ExecutionContext::new(Invocation::Application);
        let entry = AuditEntry::failure(
            &ctx,
            "exec",
            serde_json::json!({"program": "/bin/rm"}),
            "VALIDATION_ERROR",
            "Program not allowed: /bin/rm",
        );

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"status\":\"failure\""));
        assert!(json.contains("\"error_code\":\"VALIDATION_ERROR\""));
        assert!(!json.contains("\"channel\""));
    }

    #[test]
    fn test_success_without_data() {
        let result = AuditResult::Success { data: None };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, "{\"status\":\"success\"}");
    }
}
