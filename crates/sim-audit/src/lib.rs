//! Audit and event log for sandbox-sim
//!
//! Provides the single shared log every engine component writes to. It is
//! both the operational log and the audit trail.
//!
//! # Architecture
//!
//! This crate provides:
//! - `AuditLog`, a bounded ring buffer (newest first) with query and export
//! - `LogEntry` / `NewLogEntry`, the structured entry and its builder
//! - The `LogSink` trait, mirroring every entry somewhere human-readable
//! - `AuditEvent`, a convenience wrapper for collection-level actions
//!
//! ## Sinks
//!
//! - `TracingSink` - Emits each entry as a `tracing` event at the matching level
//! - `NullSink` - Discards entries (tests)
//!
//! The buffer holds at most [`LOG_CAPACITY`] entries by default; once full,
//! the oldest entry is dropped for every new one.

mod audit;
mod entry;
mod log;
mod sink;

// Re-export entry types
pub use entry::{LogEntry, LogLevel, NewLogEntry};

// Re-export log types
pub use log::{AuditError, AuditLog, ExportFormat, LogQuery, DEFAULT_QUERY_LIMIT, LOG_CAPACITY};

// Re-export audit event types
pub use audit::{AuditAction, AuditEvent, Severity, AUDIT_SOURCE};

// Re-export sink trait and implementations
pub use sink::{LogSink, NullSink, TracingSink};
