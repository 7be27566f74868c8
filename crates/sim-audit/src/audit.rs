//! Collection-level audit events

use crate::entry::{LogLevel, NewLogEntry};
use crate::log::AuditLog;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Source recorded on every audit entry.
pub const AUDIT_SOURCE: &str = "audit";

/// Actions recorded against a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Activate,
    Archive,
    Run,
    Toggle,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Activate => "activate",
            AuditAction::Archive => "archive",
            AuditAction::Run => "run",
            AuditAction::Toggle => "toggle",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How loudly an audit event is logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

impl From<Severity> for LogLevel {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Critical => LogLevel::Error,
            Severity::Warning => LogLevel::Warn,
            Severity::Info => LogLevel::Info,
        }
    }
}

/// An action taken against a named collection (e.g. `jobs`, `connectors`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub environment_id: String,
    pub action: AuditAction,
    pub collection: String,
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(
        environment_id: impl Into<String>,
        action: AuditAction,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            environment_id: environment_id.into(),
            action,
            collection: collection.into(),
            record_id: None,
            actor: None,
            severity: Severity::Info,
            details: None,
        }
    }

    pub fn record(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn message(&self) -> String {
        match &self.record_id {
            Some(id) => format!("{} {}/{}", self.action, self.collection, id),
            None => format!("{} {}", self.action, self.collection),
        }
    }

    fn into_log_entry(self) -> NewLogEntry {
        let message = self.message();
        let details = serde_json::json!({
            "action": self.action,
            "collection": self.collection,
            "record_id": self.record_id,
            "actor": self.actor,
            "details": self.details,
        });
        NewLogEntry::new(self.environment_id, self.severity.into(), AUDIT_SOURCE, message)
            .details(details)
    }
}

impl AuditLog {
    /// Record an audit event as a log entry and return the entry id.
    pub fn audit(&self, event: AuditEvent) -> Uuid {
        self.log(event.into_log_entry())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{LogQuery, LOG_CAPACITY};
    use crate::sink::NullSink;

    #[test]
    fn test_severity_maps_to_level() {
        assert_eq!(LogLevel::from(Severity::Critical), LogLevel::Error);
        assert_eq!(LogLevel::from(Severity::Warning), LogLevel::Warn);
        assert_eq!(LogLevel::from(Severity::Info), LogLevel::Info);
    }

    #[test]
    fn test_audit_writes_entry() {
        let log = AuditLog::with_sink(LOG_CAPACITY, NullSink);
        let id = log.audit(
            AuditEvent::new("env-1", AuditAction::Archive, "connectors")
                .record("custodian_mock")
                .actor("ops")
                .severity(Severity::Warning),
        );

        let entry = log.get(id).unwrap();
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.source, AUDIT_SOURCE);
        assert_eq!(entry.message, "archive connectors/custodian_mock");
        let details = entry.details.unwrap();
        assert_eq!(details["action"], "archive");
        assert_eq!(details["actor"], "ops");

        let audits = log.query(&LogQuery::default().source(AUDIT_SOURCE));
        assert_eq!(audits.len(), 1);
    }

    #[test]
    fn test_audit_event_deserializes_with_defaults() {
        let event: AuditEvent = serde_json::from_str(
            r#"{ "environment_id": "env-1", "action": "toggle", "collection": "webhooks" }"#,
        )
        .unwrap();
        assert_eq!(event.action, AuditAction::Toggle);
        assert_eq!(event.severity, Severity::Info);
        assert_eq!(event.message(), "toggle webhooks");
    }
}
