//! Job execution

use super::injection::strip_identifiers;
use super::{
    JobConfig, JobError, JobPhase, JobProgress, JobResult, JobStatus, CANCELLED, INVALID_RECORD,
    RUNTIME_ERROR, VALIDATION_FAILED,
};
use crate::config::EngineSettings;
use crate::persist::{NullRecordSink, RecordSink};
use anyhow::Context;
use chrono::Utc;
use sim_audit::{AuditLog, NewLogEntry};
use sim_core::{identifier_of, Value, IDENTIFIER_FIELDS};
use sim_generator::{DataGenerator, MockPayload};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Source recorded on every job log entry.
pub const LOG_SOURCE: &str = "job_runner";

/// Callback invoked synchronously at each progress checkpoint.
pub type ProgressCallback<'a> = &'a (dyn Fn(&JobProgress) + Send + Sync);

/// Counters accumulated while a job runs.
#[derive(Default)]
struct Tally {
    processed: usize,
    created: usize,
    updated: usize,
    error_count: usize,
    payload_ids: Vec<String>,
    errors: Vec<JobError>,
}

struct Reporter<'a> {
    job_id: &'a str,
    callback: Option<ProgressCallback<'a>>,
}

impl Reporter<'_> {
    fn report(&self, phase: JobPhase, records_processed: usize) {
        debug!(
            job_id = self.job_id,
            phase = %phase,
            percent = phase.percent(),
            records_processed,
            "Job progress"
        );
        if let Some(callback) = self.callback {
            callback(&JobProgress {
                job_id: self.job_id.to_string(),
                phase,
                percent: phase.percent(),
                records_processed,
                message: phase.description(),
            });
        }
    }
}

/// Runs jobs against a shared generator and audit log.
///
/// The runner never returns an error: injected failures, runtime failures
/// and cancellation are all reported through [`JobResult::status`] and
/// [`JobResult::errors`].
pub struct JobRunner {
    generator: Arc<Mutex<DataGenerator>>,
    log: Arc<AuditLog>,
    sink: Arc<dyn RecordSink>,
    settings: EngineSettings,
    active: std::sync::Mutex<HashMap<String, Vec<ActiveRun>>>,
    next_run: AtomicU64,
}

/// One in-flight run. Re-runs of a config share its job id, so each run
/// is told apart by a runner-local serial.
struct ActiveRun {
    serial: u64,
    token: CancellationToken,
}

impl JobRunner {
    /// Create a runner that persists into a [`NullRecordSink`].
    pub fn new(
        generator: Arc<Mutex<DataGenerator>>,
        log: Arc<AuditLog>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            generator,
            log,
            sink: Arc::new(NullRecordSink),
            settings,
            active: std::sync::Mutex::new(HashMap::new()),
            next_run: AtomicU64::new(0),
        }
    }

    /// Persist valid records into `sink` instead.
    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn generator(&self) -> &Arc<Mutex<DataGenerator>> {
        &self.generator
    }

    fn active(&self) -> MutexGuard<'_, HashMap<String, Vec<ActiveRun>>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, job_id: &str) -> (u64, CancellationToken) {
        let serial = self.next_run.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        self.active()
            .entry(job_id.to_string())
            .or_default()
            .push(ActiveRun {
                serial,
                token: token.clone(),
            });
        (serial, token)
    }

    fn unregister(&self, job_id: &str, serial: u64) {
        let mut active = self.active();
        if let Some(runs) = active.get_mut(job_id) {
            runs.retain(|run| run.serial != serial);
            if runs.is_empty() {
                active.remove(job_id);
            }
        }
    }

    /// Ids of jobs currently in flight.
    pub fn active_jobs(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.active().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Request cancellation of a running job.
    ///
    /// Always reports success. Every in-flight run with this id stops at
    /// its next phase boundary with status `cancelled`; unknown ids are
    /// ignored.
    pub fn cancel(&self, job_id: &str) -> bool {
        match self.active().get(job_id) {
            Some(runs) => {
                info!(job_id, runs = runs.len(), "Cancelling job");
                for run in runs {
                    run.token.cancel();
                }
            }
            None => debug!(job_id, "Cancel requested for a job that is not running"),
        }
        true
    }

    /// Run one job to completion.
    pub async fn run(
        &self,
        config: JobConfig,
        on_progress: Option<ProgressCallback<'_>>,
    ) -> JobResult {
        let job_id = config
            .id
            .clone()
            .unwrap_or_else(|| format!("job_{}", Uuid::new_v4().simple()));
        let (serial, token) = self.register(&job_id);

        let started_at = Utc::now();
        let start = Instant::now();
        let reporter = Reporter {
            job_id: &job_id,
            callback: on_progress,
        };
        let mut tally = Tally::default();

        let status = match self
            .execute(&config, &job_id, &token, &reporter, &mut tally)
            .await
        {
            Ok(status) => status,
            Err(err) => {
                warn!(job_id, error = %err, "Job failed with a runtime error");
                self.log.log(
                    NewLogEntry::error(
                        &config.environment_id,
                        LOG_SOURCE,
                        format!("Job {job_id} failed: {err:#}"),
                    )
                    .job(&job_id)
                    .stack_trace(format!("{err:?}")),
                );
                // Nothing from an aborted run counts as delivered
                tally.created = 0;
                tally.updated = 0;
                tally.payload_ids.clear();
                tally.errors.push(JobError::new(RUNTIME_ERROR, format!("{err:#}")));
                reporter.report(JobPhase::Failed, tally.processed);
                JobStatus::Failed
            }
        };

        self.unregister(&job_id, serial);

        JobResult {
            job_id: job_id.clone(),
            status,
            records_processed: tally.processed,
            records_created: tally.created,
            records_updated: tally.updated,
            error_count: tally.error_count,
            payload_ids: tally.payload_ids,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            errors: tally.errors,
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn execute(
        &self,
        config: &JobConfig,
        job_id: &str,
        token: &CancellationToken,
        reporter: &Reporter<'_>,
        tally: &mut Tally,
    ) -> anyhow::Result<JobStatus> {
        let env = config.environment_id.as_str();

        reporter.report(JobPhase::Initializing, 0);
        info!(
            job_id,
            connector = %config.connector_id,
            kind = %config.kind,
            entity = %config.entity,
            batch_size = config.batch_size,
            "Job started"
        );
        self.log.log(
            NewLogEntry::info(
                env,
                LOG_SOURCE,
                format!(
                    "Starting {} job for {} ({} x {})",
                    config.kind, config.connector_id, config.batch_size, config.entity
                ),
            )
            .job(job_id)
            .details(serde_json::json!({
                "connector_id": config.connector_id,
                "kind": config.kind,
                "entity": config.entity,
                "batch_size": config.batch_size,
                "seed": config.seed,
            })),
        );

        if let Some(status) = self.inject_failure(config, job_id, reporter, tally).await {
            return Ok(status);
        }

        // Fetching
        if let Some(status) = self
            .advance(JobPhase::Fetching, config, job_id, token, reporter, tally)
            .await
        {
            return Ok(status);
        }
        let payload = self.fetch(config).await;
        tally.processed = payload.len();
        debug!(job_id, records = tally.processed, "Fetched records");

        // Mapping
        if let Some(status) = self
            .advance(JobPhase::Mapping, config, job_id, token, reporter, tally)
            .await
        {
            return Ok(status);
        }
        let mapping_rules = config.rules.as_ref().filter(|rules| !rules.is_passthrough());
        let mapped: Vec<Value> = payload
            .records
            .into_iter()
            .map(|record| match mapping_rules {
                Some(rules) => rules.apply(&record.to_value()),
                None => record.into_value(),
            })
            .collect();
        if let Some(rules) = mapping_rules {
            self.log.log(
                NewLogEntry::info(
                    env,
                    LOG_SOURCE,
                    format!(
                        "Applied {} mapping and {} transform rules to {} records",
                        rules.mappings.len(),
                        rules.transforms.len(),
                        mapped.len()
                    ),
                )
                .job(job_id),
            );
        }

        // Validating
        if let Some(status) = self
            .advance(JobPhase::Validating, config, job_id, token, reporter, tally)
            .await
        {
            return Ok(status);
        }
        let mut valid = Vec::with_capacity(mapped.len());
        for (index, record) in mapped.into_iter().enumerate() {
            let index = index as u64;
            if let Some(rules) = &config.rules {
                tally
                    .errors
                    .extend(rules.validate(&record).errors.into_iter().map(|err| {
                        JobError::new(VALIDATION_FAILED, err.message)
                            .on_field(err.field)
                            .at_record(index)
                    }));
            }
            match identifier_of(&record) {
                Some(id) => {
                    tally.payload_ids.push(id);
                    valid.push(record);
                }
                None => {
                    tally.error_count += 1;
                    tally.errors.push(
                        JobError::new(
                            INVALID_RECORD,
                            format!(
                                "Record {index} has none of the identifier fields ({})",
                                IDENTIFIER_FIELDS.join(", ")
                            ),
                        )
                        .at_record(index),
                    );
                }
            }
        }
        if tally.error_count > 0 {
            warn!(job_id, invalid = tally.error_count, "Records failed the shape check");
        }

        // Saving
        if let Some(status) = self
            .advance(JobPhase::Saving, config, job_id, token, reporter, tally)
            .await
        {
            return Ok(status);
        }
        let valid_count = valid.len() as f64;
        let created = (self.settings.create_ratio * valid_count).floor() as usize;
        let updated = (self.settings.update_ratio * valid_count).floor() as usize;
        if config.kind.persists() {
            for record in &valid {
                self.sink
                    .create_record(config.entity, record)
                    .await
                    .with_context(|| {
                        format!(
                            "Failed to persist {} record {}",
                            config.entity,
                            identifier_of(record).unwrap_or_default()
                        )
                    })?;
            }
        }
        tally.created = created;
        tally.updated = updated;

        let threshold = self.settings.failure_threshold * tally.processed as f64;
        let status = if tally.error_count as f64 > threshold {
            JobStatus::Failed
        } else {
            JobStatus::Completed
        };

        let summary = format!(
            "{} processed, {} created, {} updated, {} errors",
            tally.processed, tally.created, tally.updated, tally.error_count
        );
        let details = serde_json::json!({
            "records_processed": tally.processed,
            "records_created": tally.created,
            "records_updated": tally.updated,
            "error_count": tally.error_count,
        });
        match status {
            JobStatus::Completed => {
                info!(job_id, "Job completed: {summary}");
                self.log.log(
                    NewLogEntry::info(env, LOG_SOURCE, format!("Job completed: {summary}"))
                        .job(job_id)
                        .details(details),
                );
                reporter.report(JobPhase::Complete, tally.processed);
            }
            _ => {
                warn!(job_id, "Job failed validation threshold: {summary}");
                self.log.log(
                    NewLogEntry::error(
                        env,
                        LOG_SOURCE,
                        format!("Job failed: too many invalid records ({summary})"),
                    )
                    .job(job_id)
                    .details(details),
                );
                reporter.report(JobPhase::Failed, tally.processed);
            }
        }

        Ok(status)
    }

    /// Consult the injection policy. Returns the final status if the run
    /// was failed by it.
    async fn inject_failure(
        &self,
        config: &JobConfig,
        job_id: &str,
        reporter: &Reporter<'_>,
        tally: &mut Tally,
    ) -> Option<JobStatus> {
        let policy = config.error_injection.as_ref().filter(|p| p.enabled)?;
        let kind = {
            let mut generator = self.generator.lock().await;
            if !policy.should_fail(generator.next_draw()) {
                return None;
            }
            policy.pick_kind(generator.next_draw())
        };

        let message = kind.message(&config.connector_id);
        warn!(job_id, code = kind.code(), "Injected failure");
        self.log.log(
            NewLogEntry::error(
                &config.environment_id,
                LOG_SOURCE,
                format!("Injected {} failure: {message}", kind.code()),
            )
            .job(job_id)
            .details(serde_json::json!({
                "code": kind.code(),
                "failure_rate": policy.failure_rate,
                "injected": true,
            })),
        );
        tally.errors.push(JobError::new(kind.code(), message));
        reporter.report(JobPhase::Failed, 0);
        Some(JobStatus::Failed)
    }

    /// Wait out the phase delay, then either report `phase` or stop the job
    /// if it was cancelled. Returns the final status when stopping.
    async fn advance(
        &self,
        phase: JobPhase,
        config: &JobConfig,
        job_id: &str,
        token: &CancellationToken,
        reporter: &Reporter<'_>,
        tally: &mut Tally,
    ) -> Option<JobStatus> {
        let delay = self.settings.phase_delay();
        if !delay.is_zero() {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {}
            }
        }

        if !token.is_cancelled() {
            reporter.report(phase, tally.processed);
            return None;
        }

        let message = format!("Job cancelled before {phase}");
        warn!(job_id, phase = %phase, "Job cancelled");
        self.log
            .log(NewLogEntry::warn(&config.environment_id, LOG_SOURCE, &message).job(job_id));
        tally.errors.push(JobError::new(CANCELLED, message));
        reporter.report(JobPhase::Cancelled, tally.processed);
        Some(JobStatus::Cancelled)
    }

    /// Generate the batch and apply per-record corruption.
    async fn fetch(&self, config: &JobConfig) -> MockPayload {
        let mut generator = self.generator.lock().await;
        let mut records = generator.generate(config.entity, config.batch_size, config.seed);
        if let Some(policy) = config
            .error_injection
            .as_ref()
            .filter(|p| p.corrupts_records())
        {
            for record in &mut records {
                if policy.should_corrupt(generator.next_draw()) {
                    strip_identifiers(record);
                }
            }
        }
        MockPayload::new(&config.connector_id, config.entity, config.seed, records)
    }
}
