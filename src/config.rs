//! Engine settings and simulation files
//!
//! A simulation file bundles settings with a list of jobs and replays:
//!
//! ```yaml
//! settings:
//!   initial_seed: 7
//!   phase_delay_ms: 0
//! jobs:
//!   - connector_id: custodian_mock
//!     kind: sync
//!     entity: positions
//!     batch_size: 10
//!     seed: 12345
//! replays:
//!   - environment_id: sandbox
//!     event_kind: webhook.test
//!     count: 5
//!     webhook:
//!       url: https://example.test/hooks
//! ```

use crate::job::{InjectionError, JobConfig};
use crate::replay::ReplayConfig;
use serde::{Deserialize, Serialize};
use sim_audit::LOG_CAPACITY;
use sim_generator::generator::DEFAULT_SEED;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Error type for loading simulation files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading the file
    #[error("Failed to read simulation file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A value is out of range
    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: String, reason: String },

    /// A job's error-injection policy is malformed
    #[error("Invalid error injection for jobs[{job}]: {source}")]
    InvalidInjection {
        job: usize,
        #[source]
        source: InjectionError,
    },
}

/// Tunables shared by the job runner and replay engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Seed the shared generator starts from
    pub initial_seed: u32,
    /// Pause between job phases
    pub phase_delay_ms: u64,
    /// Pause between replayed events
    pub event_delay_ms: u64,
    /// Share of valid records reported as created
    pub create_ratio: f64,
    /// Share of valid records reported as updated
    pub update_ratio: f64,
    /// A job fails when more than this share of its batch is invalid
    pub failure_threshold: f64,
    /// Entries retained by the audit log
    pub log_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            initial_seed: DEFAULT_SEED,
            phase_delay_ms: 150,
            event_delay_ms: 50,
            create_ratio: 0.95,
            update_ratio: 0.05,
            failure_threshold: 0.5,
            log_capacity: LOG_CAPACITY,
        }
    }
}

impl EngineSettings {
    /// Default settings with every artificial delay removed.
    pub fn immediate() -> Self {
        Self {
            phase_delay_ms: 0,
            event_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn phase_delay(&self) -> Duration {
        Duration::from_millis(self.phase_delay_ms)
    }

    pub fn event_delay(&self) -> Duration {
        Duration::from_millis(self.event_delay_ms)
    }

    /// Check that ratios and thresholds are fractions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("create_ratio", self.create_ratio),
            ("update_ratio", self.update_ratio),
            ("failure_threshold", self.failure_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: format!("{value} is not between 0 and 1"),
                });
            }
        }
        if self.log_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "log_capacity".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// A batch of jobs and replays to run against one engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationFile {
    #[serde(default)]
    pub settings: EngineSettings,
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
    #[serde(default)]
    pub replays: Vec<ReplayConfig>,
}

impl SimulationFile {
    /// Load a simulation from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a simulation from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let file: SimulationFile = serde_yaml::from_str(yaml)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.settings.validate()?;
        for (i, job) in self.jobs.iter().enumerate() {
            if let Some(policy) = &job.error_injection {
                policy
                    .validate()
                    .map_err(|source| ConfigError::InvalidInjection { job: i, source })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{InjectedErrorKind, JobKind};
    use sim_core::EntityKind;

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert_eq!(settings.initial_seed, 42);
        assert_eq!(settings.phase_delay(), Duration::from_millis(150));
        assert_eq!(settings.log_capacity, 1000);
        assert!(settings.validate().is_ok());

        let immediate = EngineSettings::immediate();
        assert_eq!(immediate.phase_delay(), Duration::ZERO);
        assert_eq!(immediate.event_delay(), Duration::ZERO);
        assert_eq!(immediate.create_ratio, 0.95);
    }

    #[test]
    fn test_parse_simulation_file() {
        let yaml = r#"
settings:
  initial_seed: 7
  phase_delay_ms: 0
jobs:
  - id: nightly
    connector_id: custodian_mock
    kind: sync
    entity: positions
    batch_size: 10
    seed: 12345
    rules:
      mappings:
        - source_field: position_id
          target_field: id
    error_injection:
      enabled: true
      failure_rate: 25
      error_kinds: [timeout, rate_limit]
replays:
  - environment_id: sandbox
    event_kind: webhook.test
    count: 5
    webhook:
      url: https://example.test/hooks
"#;
        let file = SimulationFile::from_yaml(yaml).unwrap();

        assert_eq!(file.settings.initial_seed, 7);
        assert_eq!(file.settings.event_delay_ms, 50);

        let job = &file.jobs[0];
        assert_eq!(job.id.as_deref(), Some("nightly"));
        assert_eq!(job.kind, JobKind::Sync);
        assert_eq!(job.entity, EntityKind::Position);
        assert_eq!(job.environment_id, "sandbox");
        assert_eq!(job.rules.as_ref().unwrap().mappings.len(), 1);
        let policy = job.error_injection.as_ref().unwrap();
        assert_eq!(
            policy.error_kinds,
            [InjectedErrorKind::Timeout, InjectedErrorKind::RateLimit]
        );

        let replay = &file.replays[0];
        assert_eq!(replay.count, 5);
        assert!(replay.webhook.as_ref().unwrap().simulate);
    }

    #[test]
    fn test_rejects_out_of_range_ratio() {
        let result = SimulationFile::from_yaml("settings:\n  create_ratio: 1.5\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { ref field, .. }) if field == "create_ratio"
        ));
    }

    #[test]
    fn test_rejects_out_of_range_failure_rate() {
        let yaml = r#"
jobs:
  - connector_id: crm
    kind: pull
    entity: contact
    batch_size: 5
    error_injection:
      enabled: true
      failure_rate: 140
"#;
        let result = SimulationFile::from_yaml(yaml);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidInjection {
                job: 0,
                source: InjectionError::RateOutOfRange {
                    field: "failure_rate",
                    ..
                },
            })
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.yaml");
        fs::write(&path, "settings:\n  event_delay_ms: 5\n").unwrap();

        let file = SimulationFile::from_file(&path).unwrap();
        assert_eq!(file.settings.event_delay_ms, 5);
        assert!(file.jobs.is_empty());

        let missing = SimulationFile::from_file(dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(ConfigError::IoError(_))));
    }
}
