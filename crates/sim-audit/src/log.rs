//! Bounded ring buffer of log entries

use crate::entry::{LogEntry, LogLevel, NewLogEntry};
use crate::sink::{LogSink, TracingSink};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Number of entries retained before the oldest is evicted.
pub const LOG_CAPACITY: usize = 1000;

/// Limit applied when a query does not set one.
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Error type for log export.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Failed to serialize log entries as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error while exporting: {0}")]
    Io(#[from] std::io::Error),

    #[error("Exported CSV is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Export encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Filter for [`AuditLog::query`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    pub environment_id: Option<String>,
    #[serde(default)]
    pub level: Option<LogLevel>,
    #[serde(default)]
    pub source: Option<String>,
    /// Defaults to [`DEFAULT_QUERY_LIMIT`]
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LogQuery {
    pub fn environment(mut self, environment_id: impl Into<String>) -> Self {
        self.environment_id = Some(environment_id.into());
        self
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, entry: &LogEntry) -> bool {
        self.environment_id
            .as_ref()
            .is_none_or(|env| *env == entry.environment_id)
            && self.level.is_none_or(|level| level == entry.level)
            && self.source.as_ref().is_none_or(|src| *src == entry.source)
    }
}

/// Flat row layout used for CSV export.
#[derive(Serialize)]
struct CsvRow<'a> {
    id: String,
    timestamp: String,
    level: &'static str,
    environment_id: &'a str,
    source: &'a str,
    message: &'a str,
    job_id: Option<&'a str>,
    event_id: Option<&'a str>,
    correlation_id: Option<&'a str>,
    details: Option<String>,
    stack_trace: Option<&'a str>,
}

impl<'a> From<&'a LogEntry> for CsvRow<'a> {
    fn from(entry: &'a LogEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            timestamp: entry.timestamp.to_rfc3339(),
            level: entry.level.as_str(),
            environment_id: &entry.environment_id,
            source: &entry.source,
            message: &entry.message,
            job_id: entry.job_id.as_deref(),
            event_id: entry.event_id.as_deref(),
            correlation_id: entry.correlation_id.as_deref(),
            details: entry.details.as_ref().map(|d| d.to_string()),
            stack_trace: entry.stack_trace.as_deref(),
        }
    }
}

/// Shared operational and audit log.
///
/// Entries are kept newest first. Once `capacity` entries are held, each
/// new entry evicts the oldest. Every stored entry is also handed to the
/// configured [`LogSink`].
pub struct AuditLog {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    sink: Box<dyn LogSink>,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl AuditLog {
    /// Log with [`LOG_CAPACITY`] entries, mirrored to `tracing`.
    pub fn new() -> Self {
        Self::with_sink(LOG_CAPACITY, TracingSink)
    }

    /// Log with a custom capacity and sink. A capacity of zero is raised to one.
    pub fn with_sink(capacity: usize, sink: impl LogSink + 'static) -> Self {
        Self::with_boxed_sink(capacity, Box::new(sink))
    }

    /// [`AuditLog::with_sink`] for a sink chosen at runtime.
    pub fn with_boxed_sink(capacity: usize, sink: Box<dyn LogSink>) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            sink,
        }
    }

    fn entries(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        // Entries are plain data, so a poisoned buffer is still consistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an entry and return its id.
    pub fn log(&self, entry: NewLogEntry) -> Uuid {
        let entry = entry.into_entry();
        let id = entry.id;
        {
            let mut entries = self.entries();
            entries.push_front(entry.clone());
            while entries.len() > self.capacity {
                entries.pop_back();
            }
        }
        self.sink.write(&entry);
        id
    }

    /// Matching entries, newest first.
    pub fn query(&self, query: &LogQuery) -> Vec<LogEntry> {
        let limit = query.limit.unwrap_or(DEFAULT_QUERY_LIMIT);
        self.entries()
            .iter()
            .filter(|entry| query.matches(entry))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Look up a single entry by id.
    pub fn get(&self, id: Uuid) -> Option<LogEntry> {
        self.entries().iter().find(|entry| entry.id == id).cloned()
    }

    /// Every retained entry, newest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries().iter().cloned().collect()
    }

    /// Serialize every retained entry, newest first.
    pub fn export(&self, format: ExportFormat) -> Result<String, AuditError> {
        let entries = self.snapshot();
        match format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&entries)?),
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                for entry in &entries {
                    writer.serialize(CsvRow::from(entry))?;
                }
                let bytes = writer.into_inner().map_err(|e| e.into_error())?;
                Ok(String::from_utf8(bytes)?)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NullSink;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<String>>>);

    impl LogSink for RecordingSink {
        fn write(&self, entry: &LogEntry) {
            self.0.lock().unwrap().push(entry.message.clone());
        }
    }

    fn quiet_log() -> AuditLog {
        AuditLog::with_sink(LOG_CAPACITY, NullSink)
    }

    #[test]
    fn test_log_assigns_id_and_orders_newest_first() {
        let log = quiet_log();
        let first = log.log(NewLogEntry::info("env-1", "test", "one"));
        let second = log.log(NewLogEntry::info("env-1", "test", "two"));

        assert_ne!(first, second);
        let entries = log.snapshot();
        assert_eq!(entries[0].id, second);
        assert_eq!(entries[1].message, "one");
        assert!(entries[0].timestamp >= entries[1].timestamp);
        assert_eq!(log.get(first).unwrap().message, "one");
    }

    #[test]
    fn test_eviction_at_capacity() {
        let log = quiet_log();
        let oldest = log.log(NewLogEntry::info("env-1", "test", "entry 0"));
        for i in 1..=LOG_CAPACITY {
            log.log(NewLogEntry::info("env-1", "test", format!("entry {i}")));
        }

        assert_eq!(log.len(), LOG_CAPACITY);
        assert!(log.get(oldest).is_none());
        let entries = log.snapshot();
        assert_eq!(entries.first().unwrap().message, "entry 1000");
        assert_eq!(entries.last().unwrap().message, "entry 1");
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let log = AuditLog::with_sink(0, NullSink);
        log.log(NewLogEntry::info("env-1", "test", "a"));
        log.log(NewLogEntry::info("env-1", "test", "b"));
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.snapshot()[0].message, "b");
    }

    #[test]
    fn test_query_filters_and_limit() {
        let log = quiet_log();
        for i in 0..150 {
            log.log(NewLogEntry::info("env-a", "job_runner", format!("a{i}")));
        }
        log.log(NewLogEntry::error("env-b", "replay", "boom"));
        log.log(NewLogEntry::warn("env-a", "replay", "slow"));

        assert_eq!(log.query(&LogQuery::default()).len(), DEFAULT_QUERY_LIMIT);

        let errors = log.query(&LogQuery::default().level(LogLevel::Error));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].environment_id, "env-b");

        let replay_a = log.query(&LogQuery::default().environment("env-a").source("replay"));
        assert_eq!(replay_a.len(), 1);
        assert_eq!(replay_a[0].message, "slow");

        let limited = log.query(&LogQuery::default().environment("env-a").limit(3));
        let messages: Vec<&str> = limited.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["slow", "a149", "a148"]);
    }

    #[test]
    fn test_sink_receives_every_entry() {
        let sink = RecordingSink::default();
        let log = AuditLog::with_sink(2, sink.clone());
        log.log(NewLogEntry::info("env-1", "test", "x"));
        log.log(NewLogEntry::info("env-1", "test", "y"));
        log.log(NewLogEntry::info("env-1", "test", "z"));

        assert_eq!(log.len(), 2);
        assert_eq!(*sink.0.lock().unwrap(), ["x", "y", "z"]);
    }

    #[test]
    fn test_clear() {
        let log = quiet_log();
        log.log(NewLogEntry::info("env-1", "test", "x"));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_export_json() {
        let log = quiet_log();
        log.log(NewLogEntry::info("env-1", "test", "first").job("job-1"));
        log.log(NewLogEntry::error("env-1", "test", "second"));

        let json = log.export(ExportFormat::Json).unwrap();
        let parsed: Vec<LogEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].message, "second");
        assert_eq!(parsed[1].job_id.as_deref(), Some("job-1"));
    }

    #[test]
    fn test_export_csv() {
        let log = quiet_log();
        log.log(
            NewLogEntry::info("env-1", "test", "has, comma")
                .details(serde_json::json!({ "n": 1 })),
        );

        let csv = log.export(ExportFormat::Csv).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "id");
        assert_eq!(&headers[2], "level");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][2], "info");
        assert_eq!(&rows[0][5], "has, comma");
        assert_eq!(&rows[0][6], "");
        assert_eq!(&rows[0][9], r#"{"n":1}"#);
    }

    #[test]
    fn test_concurrent_logging() {
        let log = Arc::new(quiet_log());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        log.log(NewLogEntry::info("env-1", "test", format!("{t}-{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(log.len(), 200);
    }
}
