//! Event replay and webhook delivery simulation
//!
//! A replay synthesizes `count` events of one kind, logs each, and, when a
//! webhook target is configured, hands each to a [`WebhookTransport`].

mod engine;
mod event;
mod webhook;

pub use engine::{ReplayEngine, ReplayProgressCallback, LOG_SOURCE};
pub use event::{synthesize_payload, EventKind, GeneratedEvent, UnknownEventKind};
pub use webhook::{
    request_body, request_headers, DeliveryStatus, SimulatedTransport, WebhookDelivery,
    WebhookTarget, WebhookTransport, DELIVERY_HEADER, EVENT_HEADER, EVENT_KIND_HEADER,
};

use crate::job::default_environment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration for one replay run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    #[serde(default = "default_environment")]
    pub environment_id: String,
    pub event_kind: EventKind,
    pub count: usize,
    #[serde(default)]
    pub webhook: Option<WebhookTarget>,
}

impl ReplayConfig {
    pub fn new(environment_id: impl Into<String>, event_kind: EventKind, count: usize) -> Self {
        Self {
            environment_id: environment_id.into(),
            event_kind,
            count,
            webhook: None,
        }
    }

    pub fn with_webhook(mut self, target: WebhookTarget) -> Self {
        self.webhook = Some(target);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayStatus {
    Completed,
    Failed,
}

/// Outcome of one replay run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    pub replay_id: String,
    pub status: ReplayStatus,
    pub events_generated: usize,
    pub deliveries_created: usize,
    /// Audit log entries written by this run
    pub logs_created: usize,
    pub duration_ms: u64,
    pub errors: Vec<String>,
    pub events: Vec<GeneratedEvent>,
    pub deliveries: Vec<WebhookDelivery>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Progress report handed to callbacks after each event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayProgress {
    pub replay_id: String,
    pub current: usize,
    pub total: usize,
    pub event_id: String,
}
