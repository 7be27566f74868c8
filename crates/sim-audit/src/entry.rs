//! Log entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored log entry.
///
/// `id` and `timestamp` are assigned by [`crate::AuditLog::log`]; callers
/// build entries through [`NewLogEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub environment_id: String,
    pub level: LogLevel,
    /// Component that wrote the entry (e.g. `job_runner`, `replay`)
    pub source: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// An entry waiting to be logged.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub environment_id: String,
    pub level: LogLevel,
    pub source: String,
    pub message: String,
    pub job_id: Option<String>,
    pub event_id: Option<String>,
    pub correlation_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub stack_trace: Option<String>,
}

impl NewLogEntry {
    pub fn new(
        environment_id: impl Into<String>,
        level: LogLevel,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            environment_id: environment_id.into(),
            level,
            source: source.into(),
            message: message.into(),
            job_id: None,
            event_id: None,
            correlation_id: None,
            details: None,
            stack_trace: None,
        }
    }

    pub fn info(
        environment_id: impl Into<String>,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(environment_id, LogLevel::Info, source, message)
    }

    pub fn warn(
        environment_id: impl Into<String>,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(environment_id, LogLevel::Warn, source, message)
    }

    pub fn error(
        environment_id: impl Into<String>,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(environment_id, LogLevel::Error, source, message)
    }

    pub fn job(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn event(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    pub fn correlation(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    /// Stamp the entry with an id and the current time.
    pub(crate) fn into_entry(self) -> LogEntry {
        LogEntry {
            id: Uuid::new_v4(),
            environment_id: self.environment_id,
            level: self.level,
            source: self.source,
            message: self.message,
            job_id: self.job_id,
            event_id: self.event_id,
            correlation_id: self.correlation_id,
            details: self.details,
            stack_trace: self.stack_trace,
            timestamp: Utc::now(),
        }
    }
}
