//! Phased job runner
//!
//! A job simulates one connector operation. It moves through
//! `initializing → fetching → mapping → validating → saving → complete`,
//! reporting progress at fixed checkpoints, and can end early in `failed`
//! (injected or runtime error, or too many invalid records) or `cancelled`.

mod injection;
mod runner;

pub use injection::{
    strip_identifiers, ErrorInjectionPolicy, InjectedErrorKind, InjectionError,
};
pub use runner::{JobRunner, ProgressCallback};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sim_core::EntityKind;
use sim_mapping::RuleSet;
use std::fmt;

/// Environment used when a config does not name one.
pub const DEFAULT_ENVIRONMENT: &str = "sandbox";

/// Error code for failures that were not injected.
pub const RUNTIME_ERROR: &str = "RUNTIME_ERROR";

/// Error code for jobs stopped by [`JobRunner::cancel`].
pub const CANCELLED: &str = "CANCELLED";

/// Error code for records failing the minimal shape check.
pub const INVALID_RECORD: &str = "INVALID_RECORD";

/// Error code for records failing a configured validation rule.
pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";

pub(crate) fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

/// Operation a job simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Pull,
    Push,
    Sync,
    /// Runs every phase but never persists
    Validate,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Pull => "pull",
            JobKind::Push => "push",
            JobKind::Sync => "sync",
            JobKind::Validate => "validate",
        }
    }

    pub fn persists(&self) -> bool {
        !matches!(self, JobKind::Validate)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase a job is in, as reported to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Initializing,
    Fetching,
    Mapping,
    Validating,
    Saving,
    Complete,
    Failed,
    Cancelled,
}

impl JobPhase {
    /// Fixed progress checkpoint for the phase.
    pub fn percent(&self) -> u8 {
        match self {
            JobPhase::Initializing => 0,
            JobPhase::Fetching => 20,
            JobPhase::Mapping => 40,
            JobPhase::Validating => 60,
            JobPhase::Saving => 80,
            JobPhase::Complete | JobPhase::Failed | JobPhase::Cancelled => 100,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Initializing => "initializing",
            JobPhase::Fetching => "fetching",
            JobPhase::Mapping => "mapping",
            JobPhase::Validating => "validating",
            JobPhase::Saving => "saving",
            JobPhase::Complete => "complete",
            JobPhase::Failed => "failed",
            JobPhase::Cancelled => "cancelled",
        }
    }

    /// Human-readable description shown next to the percentage.
    pub fn description(&self) -> &'static str {
        match self {
            JobPhase::Initializing => "Initializing job",
            JobPhase::Fetching => "Fetching records from connector",
            JobPhase::Mapping => "Applying field mappings",
            JobPhase::Validating => "Validating records",
            JobPhase::Saving => "Saving records",
            JobPhase::Complete => "Job complete",
            JobPhase::Failed => "Job failed",
            JobPhase::Cancelled => "Job cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobPhase::Complete | JobPhase::Failed | JobPhase::Cancelled
        )
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for one job run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Generated when absent
    #[serde(default)]
    pub id: Option<String>,
    pub connector_id: String,
    pub kind: JobKind,
    pub entity: EntityKind,
    pub batch_size: usize,
    /// Reseeds the shared generator before fetching
    #[serde(default)]
    pub seed: Option<u32>,
    /// Records pass through unchanged when absent
    #[serde(default)]
    pub rules: Option<RuleSet>,
    #[serde(default)]
    pub error_injection: Option<ErrorInjectionPolicy>,
    #[serde(default = "default_environment")]
    pub environment_id: String,
}

impl JobConfig {
    pub fn new(
        connector_id: impl Into<String>,
        kind: JobKind,
        entity: EntityKind,
        batch_size: usize,
    ) -> Self {
        Self {
            id: None,
            connector_id: connector_id.into(),
            kind,
            entity,
            batch_size,
            seed: None,
            rules: None,
            error_injection: None,
            environment_id: default_environment(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_error_injection(mut self, policy: ErrorInjectionPolicy) -> Self {
        self.error_injection = Some(policy);
        self
    }

    pub fn with_environment(mut self, environment_id: impl Into<String>) -> Self {
        self.environment_id = environment_id.into();
        self
    }
}

/// Structured error attached to a job result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_index: Option<u64>,
}

impl JobError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            field: None,
            record_index: None,
        }
    }

    pub fn at_record(mut self, index: u64) -> Self {
        self.record_index = Some(index);
        self
    }

    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Outcome of one job run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub job_id: String,
    pub status: JobStatus,
    pub records_processed: usize,
    pub records_created: usize,
    pub records_updated: usize,
    /// Records failing the minimal shape check
    pub error_count: usize,
    /// Identifiers of records that passed the shape check
    pub payload_ids: Vec<String>,
    pub duration_ms: u64,
    pub errors: Vec<JobError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Completed
    }
}

/// Progress report handed to callbacks at each checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobProgress {
    pub job_id: String,
    pub phase: JobPhase,
    pub percent: u8,
    pub records_processed: usize,
    pub message: &'static str,
}
