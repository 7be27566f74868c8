//! Replay execution

use super::event::GeneratedEvent;
use super::webhook::{SimulatedTransport, WebhookDelivery, WebhookTransport};
use super::{ReplayConfig, ReplayProgress, ReplayResult, ReplayStatus};
use crate::config::EngineSettings;
use anyhow::Context;
use chrono::Utc;
use sim_audit::{AuditLog, LogLevel, NewLogEntry};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Source recorded on every replay log entry.
pub const LOG_SOURCE: &str = "replay";

/// Callback invoked synchronously after each replayed event.
pub type ReplayProgressCallback<'a> = &'a (dyn Fn(&ReplayProgress) + Send + Sync);

#[derive(Default)]
struct ReplayState {
    events: Vec<GeneratedEvent>,
    deliveries: Vec<WebhookDelivery>,
    logs_created: usize,
}

/// Replays synthetic events through a webhook transport.
pub struct ReplayEngine {
    log: Arc<AuditLog>,
    transport: Arc<dyn WebhookTransport>,
    settings: EngineSettings,
}

impl ReplayEngine {
    /// Create an engine delivering through [`SimulatedTransport`].
    pub fn new(log: Arc<AuditLog>, settings: EngineSettings) -> Self {
        Self {
            log,
            transport: Arc::new(SimulatedTransport),
            settings,
        }
    }

    /// Deliver through `transport` instead.
    pub fn with_transport(mut self, transport: Arc<dyn WebhookTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Run one replay. Never returns an error; a failing iteration stops
    /// the run and is reported in [`ReplayResult::errors`].
    pub async fn run(
        &self,
        config: &ReplayConfig,
        on_progress: Option<ReplayProgressCallback<'_>>,
    ) -> ReplayResult {
        let replay_id = format!("rpl_{}", Uuid::new_v4().simple());
        let started_at = Utc::now();
        let start = Instant::now();
        let env = config.environment_id.as_str();
        let mut state = ReplayState::default();
        let mut errors = Vec::new();

        info!(
            replay_id,
            event_kind = %config.event_kind,
            count = config.count,
            webhook = config.webhook.is_some(),
            "Replay started"
        );
        self.log.log(
            NewLogEntry::info(
                env,
                LOG_SOURCE,
                format!("Replaying {} {} events", config.count, config.event_kind),
            )
            .correlation(&replay_id),
        );
        state.logs_created += 1;

        let mut status = ReplayStatus::Completed;
        for index in 0..config.count {
            match self.step(config, &replay_id, &mut state).await {
                Ok(event_id) => {
                    debug!(replay_id, current = index + 1, total = config.count, "Replay progress");
                    if let Some(callback) = on_progress {
                        callback(&ReplayProgress {
                            replay_id: replay_id.clone(),
                            current: index + 1,
                            total: config.count,
                            event_id,
                        });
                    }
                    let delay = self.settings.event_delay();
                    if !delay.is_zero() && index + 1 < config.count {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(err) => {
                    warn!(replay_id, error = %err, "Replay failed");
                    self.log.log(
                        NewLogEntry::error(env, LOG_SOURCE, format!("Replay failed: {err:#}"))
                            .correlation(&replay_id)
                            .stack_trace(format!("{err:?}")),
                    );
                    state.logs_created += 1;
                    errors.push(format!("{err:#}"));
                    status = ReplayStatus::Failed;
                    break;
                }
            }
        }

        if status == ReplayStatus::Completed {
            let message = format!(
                "Replay completed: {} events, {} deliveries",
                state.events.len(),
                state.deliveries.len()
            );
            info!(replay_id, "{message}");
            self.log
                .log(NewLogEntry::info(env, LOG_SOURCE, message).correlation(&replay_id));
            state.logs_created += 1;
        }

        ReplayResult {
            replay_id,
            status,
            events_generated: state.events.len(),
            deliveries_created: state.deliveries.len(),
            logs_created: state.logs_created,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            errors,
            events: state.events,
            deliveries: state.deliveries,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Generate, log and deliver one event. Returns the event id.
    async fn step(
        &self,
        config: &ReplayConfig,
        replay_id: &str,
        state: &mut ReplayState,
    ) -> anyhow::Result<String> {
        let env = config.environment_id.as_str();
        let event = GeneratedEvent::synthesize(config.event_kind, env);
        let event_id = event.id.clone();

        self.log.log(
            NewLogEntry::info(
                env,
                LOG_SOURCE,
                format!("Generated {} event {}", event.kind, event.id),
            )
            .event(&event.id)
            .correlation(replay_id)
            .details(event.payload.clone()),
        );
        state.logs_created += 1;

        let Some(target) = &config.webhook else {
            state.events.push(event);
            return Ok(event_id);
        };
        let delivery = self.transport.deliver(target, &event).await;
        state.events.push(event);
        let delivery = delivery
            .with_context(|| format!("Failed to deliver event {event_id} to {}", target.url))?;

        let level = if delivery.is_success() {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };
        self.log.log(
            NewLogEntry::new(
                env,
                level,
                LOG_SOURCE,
                format!(
                    "Webhook {} to {} ({})",
                    delivery.status.as_str(),
                    delivery.url,
                    delivery.response_status
                ),
            )
            .event(&event_id)
            .correlation(replay_id)
            .details(serde_json::json!({
                "delivery_id": delivery.id,
                "url": delivery.url,
                "status": delivery.status,
                "response_status": delivery.response_status,
            })),
        );
        state.logs_created += 1;
        state.deliveries.push(delivery);

        Ok(event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::{DeliveryStatus, EventKind, WebhookTarget};
    use async_trait::async_trait;
    use sim_audit::{LogQuery, NullSink, LOG_CAPACITY};

    struct RefusingTransport;

    #[async_trait]
    impl WebhookTransport for RefusingTransport {
        async fn deliver(
            &self,
            _target: &WebhookTarget,
            _event: &GeneratedEvent,
        ) -> anyhow::Result<WebhookDelivery> {
            anyhow::bail!("connection refused")
        }
    }

    struct RejectingTransport;

    #[async_trait]
    impl WebhookTransport for RejectingTransport {
        async fn deliver(
            &self,
            target: &WebhookTarget,
            event: &GeneratedEvent,
        ) -> anyhow::Result<WebhookDelivery> {
            let mut delivery = SimulatedTransport.deliver(target, event).await?;
            delivery.status = DeliveryStatus::Failed;
            delivery.response_status = 503;
            Ok(delivery)
        }
    }

    fn engine() -> ReplayEngine {
        ReplayEngine::new(
            Arc::new(AuditLog::with_sink(LOG_CAPACITY, NullSink)),
            EngineSettings::immediate(),
        )
    }

    #[tokio::test]
    async fn test_replay_with_webhook() {
        let engine = engine();
        let config = ReplayConfig::new("env-1", EventKind::InvoicePaid, 3)
            .with_webhook(WebhookTarget::new("https://example.test/hooks"));
        let result = engine.run(&config, None).await;

        assert_eq!(result.status, ReplayStatus::Completed);
        assert_eq!(result.events_generated, 3);
        assert_eq!(result.deliveries_created, 3);
        // start + 3 events + 3 deliveries + completion
        assert_eq!(result.logs_created, 8);
        assert_eq!(engine.log.len(), 8);
        for (event, delivery) in result.events.iter().zip(&result.deliveries) {
            assert_eq!(delivery.event_id, event.id);
        }
        let correlated = engine.log.query(&LogQuery::default().source(LOG_SOURCE));
        assert!(correlated
            .iter()
            .all(|e| e.correlation_id.as_deref() == Some(result.replay_id.as_str())));
    }

    #[tokio::test]
    async fn test_replay_without_webhook() {
        let result = engine()
            .run(&ReplayConfig::new("env-1", EventKind::RiskBreach, 4), None)
            .await;
        assert_eq!(result.events_generated, 4);
        assert_eq!(result.deliveries_created, 0);
        assert_eq!(result.logs_created, 6);
    }

    #[tokio::test]
    async fn test_transport_error_stops_run() {
        let engine = engine().with_transport(Arc::new(RefusingTransport));
        let config = ReplayConfig::new("env-1", EventKind::SyncFailed, 5)
            .with_webhook(WebhookTarget::new("https://example.test/hooks"));
        let progress = std::sync::Mutex::new(0);
        let callback = |_: &ReplayProgress| *progress.lock().unwrap() += 1;
        let result = engine.run(&config, Some(&callback)).await;

        assert_eq!(result.status, ReplayStatus::Failed);
        assert_eq!(result.events_generated, 1);
        assert_eq!(result.deliveries_created, 0);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("connection refused"));
        assert_eq!(*progress.lock().unwrap(), 0);

        let errors = engine.log.query(&LogQuery::default().level(LogLevel::Error));
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_delivery_is_logged_as_warning() {
        let engine = engine().with_transport(Arc::new(RejectingTransport));
        let config = ReplayConfig::new("env-1", EventKind::WebhookTest, 2)
            .with_webhook(WebhookTarget::new("https://example.test/hooks"));
        let result = engine.run(&config, None).await;

        assert_eq!(result.status, ReplayStatus::Completed);
        assert_eq!(result.deliveries_created, 2);
        let warnings = engine.log.query(&LogQuery::default().level(LogLevel::Warn));
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("503"));
    }

    #[tokio::test]
    async fn test_zero_count_completes_immediately() {
        let result = engine()
            .run(&ReplayConfig::new("env-1", EventKind::WebhookTest, 0), None)
            .await;
        assert_eq!(result.status, ReplayStatus::Completed);
        assert!(result.events.is_empty());
        assert_eq!(result.logs_created, 2);
    }
}
