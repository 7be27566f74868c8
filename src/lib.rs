//! Sandbox simulation engine
//!
//! Exercises an integration surface (connectors, field mappings, webhooks)
//! without touching production systems or real external services.
//!
//! # Features
//!
//! - Deterministic data: seeded synthetic records via `sim-generator`
//! - Mapping pipeline: declarative mappings, transforms and validations via `sim-mapping`
//! - Phased jobs: fetch, map, validate and save with progress and failure injection
//! - Event replay: synthetic domain events delivered to simulated webhooks
//! - Audit log: bounded, queryable, exportable via `sim-audit`
//!
//! # Example
//!
//! ```no_run
//! use sandbox_sim::{EngineSettings, JobConfig, JobKind, SandboxEngine};
//! use sim_core::EntityKind;
//!
//! # async fn example() {
//! let engine = SandboxEngine::new(EngineSettings::immediate());
//! let config = JobConfig::new("custodian_mock", JobKind::Sync, EntityKind::Position, 10)
//!     .with_seed(12345);
//! let result = engine.jobs().run(config, None).await;
//! assert_eq!(result.records_processed, 10);
//! # }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Generate three seeded positions
//! sandbox-sim generate --connector custodian_mock --entity positions --count 3 --seed 12345
//!
//! # Run a sync job and dump the audit log as CSV
//! sandbox-sim --no-delay --export csv job \
//!   --connector custodian_mock --entity positions --batch-size 10
//!
//! # Replay webhook test events
//! sandbox-sim replay --event webhook.test --count 5 --webhook-url https://example.test/hooks
//!
//! # Run a simulation file
//! sandbox-sim run demos/simulation.yaml
//! ```

pub mod config;
pub mod engine;
pub mod job;
pub mod persist;
pub mod replay;

pub use config::{ConfigError, EngineSettings, SimulationFile};
pub use engine::{SandboxEngine, SandboxEngineBuilder, SimulationReport};
pub use job::{
    ErrorInjectionPolicy, InjectedErrorKind, JobConfig, JobError, JobKind, JobPhase, JobProgress,
    JobResult, JobRunner, JobStatus,
};
pub use persist::{MemoryRecordSink, NullRecordSink, RecordSink};
pub use replay::{
    EventKind, GeneratedEvent, ReplayConfig, ReplayEngine, ReplayProgress, ReplayResult,
    ReplayStatus, SimulatedTransport, WebhookDelivery, WebhookTarget, WebhookTransport,
};
