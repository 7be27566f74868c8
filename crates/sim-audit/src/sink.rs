//! Log sinks
//!
//! A sink receives every entry after it is stored in the ring buffer.

use crate::entry::{LogEntry, LogLevel};

/// Trait for mirroring log entries.
///
/// Implementations must not block; they are called while the caller holds
/// no lock on the buffer.
pub trait LogSink: Send + Sync {
    /// Receive one stored entry.
    fn write(&self, entry: &LogEntry);
}

/// Emits each entry as a `tracing` event at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, entry: &LogEntry) {
        let job = entry.job_id.as_deref().unwrap_or("-");
        let event = entry.event_id.as_deref().unwrap_or("-");
        match entry.level {
            LogLevel::Debug => tracing::debug!(
                env = %entry.environment_id,
                source = %entry.source,
                job,
                event,
                "{}",
                entry.message
            ),
            LogLevel::Info => tracing::info!(
                env = %entry.environment_id,
                source = %entry.source,
                job,
                event,
                "{}",
                entry.message
            ),
            LogLevel::Warn => tracing::warn!(
                env = %entry.environment_id,
                source = %entry.source,
                job,
                event,
                "{}",
                entry.message
            ),
            LogLevel::Error => tracing::error!(
                env = %entry.environment_id,
                source = %entry.source,
                job,
                event,
                "{}",
                entry.message
            ),
            LogLevel::Critical => tracing::error!(
                env = %entry.environment_id,
                source = %entry.source,
                job,
                event,
                critical = true,
                "{}",
                entry.message
            ),
        }
    }
}

/// Discards every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn write(&self, _entry: &LogEntry) {}
}
