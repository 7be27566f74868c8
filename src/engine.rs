//! Engine wiring
//!
//! [`SandboxEngine`] owns the shared generator and audit log and hands them
//! to a [`JobRunner`] and a [`ReplayEngine`].

use crate::config::{EngineSettings, SimulationFile};
use crate::job::{JobResult, JobRunner};
use crate::persist::{NullRecordSink, RecordSink};
use crate::replay::{ReplayEngine, ReplayResult, SimulatedTransport, WebhookTransport};
use serde::Serialize;
use sim_audit::{AuditLog, LogSink, TracingSink};
use sim_generator::{DataGenerator, GeneratorError, MockPayload};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Results of running a [`SimulationFile`].
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub jobs: Vec<JobResult>,
    pub replays: Vec<ReplayResult>,
}

/// The generator, audit log, job runner and replay engine sharing one
/// set of settings.
pub struct SandboxEngine {
    settings: EngineSettings,
    generator: Arc<Mutex<DataGenerator>>,
    log: Arc<AuditLog>,
    jobs: JobRunner,
    replays: ReplayEngine,
}

impl SandboxEngine {
    /// Engine with a tracing-backed log, no persistence and simulated
    /// webhook delivery.
    pub fn new(settings: EngineSettings) -> Self {
        Self::builder(settings).build()
    }

    pub fn builder(settings: EngineSettings) -> SandboxEngineBuilder {
        SandboxEngineBuilder {
            settings,
            log_sink: Box::new(TracingSink),
            record_sink: Arc::new(NullRecordSink),
            transport: Arc::new(SimulatedTransport),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn generator(&self) -> &Arc<Mutex<DataGenerator>> {
        &self.generator
    }

    pub fn log(&self) -> &Arc<AuditLog> {
        &self.log
    }

    pub fn jobs(&self) -> &JobRunner {
        &self.jobs
    }

    pub fn replays(&self) -> &ReplayEngine {
        &self.replays
    }

    /// Generate a connector payload from the shared generator.
    pub async fn generate_mock_payload(
        &self,
        connector_id: &str,
        entity: &str,
        count: usize,
        seed: Option<u32>,
    ) -> Result<MockPayload, GeneratorError> {
        self.generator
            .lock()
            .await
            .generate_mock_payload(connector_id, entity, count, seed)
    }

    /// Run every job, then every replay, in file order.
    pub async fn run_file(&self, file: &SimulationFile) -> SimulationReport {
        info!(
            jobs = file.jobs.len(),
            replays = file.replays.len(),
            "Running simulation file"
        );
        let mut jobs = Vec::with_capacity(file.jobs.len());
        for config in &file.jobs {
            jobs.push(self.jobs.run(config.clone(), None).await);
        }
        let mut replays = Vec::with_capacity(file.replays.len());
        for config in &file.replays {
            replays.push(self.replays.run(config, None).await);
        }
        SimulationReport { jobs, replays }
    }
}

/// Builder for [`SandboxEngine`] collaborators.
pub struct SandboxEngineBuilder {
    settings: EngineSettings,
    log_sink: Box<dyn LogSink>,
    record_sink: Arc<dyn RecordSink>,
    transport: Arc<dyn WebhookTransport>,
}

impl SandboxEngineBuilder {
    pub fn log_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.log_sink = Box::new(sink);
        self
    }

    pub fn record_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.record_sink = sink;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn WebhookTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn build(self) -> SandboxEngine {
        let settings = self.settings;
        let generator = Arc::new(Mutex::new(DataGenerator::new(settings.initial_seed)));
        let log = Arc::new(AuditLog::with_boxed_sink(settings.log_capacity, self.log_sink));
        let jobs = JobRunner::new(Arc::clone(&generator), Arc::clone(&log), settings.clone())
            .with_sink(self.record_sink);
        let replays = ReplayEngine::new(Arc::clone(&log), settings.clone())
            .with_transport(self.transport);
        SandboxEngine {
            settings,
            generator,
            log,
            jobs,
            replays,
        }
    }
}
