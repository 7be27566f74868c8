//! Webhook delivery
//!
//! The sandbox never makes outbound calls. [`SimulatedTransport`] builds the
//! request a real sender would make and records it as delivered.

use super::event::GeneratedEvent;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Header carrying the event id.
pub const EVENT_HEADER: &str = "x-sandbox-event";
/// Header carrying the delivery id.
pub const DELIVERY_HEADER: &str = "x-sandbox-delivery";
/// Header carrying the event kind.
pub const EVENT_KIND_HEADER: &str = "x-sandbox-event-kind";

fn default_simulate() -> bool {
    true
}

/// Where replayed events are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookTarget {
    pub url: String,
    /// Extra request headers, e.g. a signature secret header
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Accepted for compatibility; delivery is always simulated
    #[serde(default = "default_simulate")]
    pub simulate: bool,
}

impl WebhookTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            simulate: true,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Recorded without a network call
    Simulated,
    /// Sent by a transport that performs real requests
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Simulated => "simulated",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
        }
    }
}

/// Record of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookDelivery {
    pub id: String,
    pub event_id: String,
    pub url: String,
    pub request_headers: BTreeMap<String, String>,
    pub request_body: serde_json::Value,
    pub status: DeliveryStatus,
    pub response_status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl WebhookDelivery {
    /// Whether the receiver accepted the delivery.
    pub fn is_success(&self) -> bool {
        self.status != DeliveryStatus::Failed && (200..300).contains(&self.response_status)
    }
}

/// Trait for webhook delivery.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Deliver one event to `target`.
    async fn deliver(&self, target: &WebhookTarget, event: &GeneratedEvent)
        -> Result<WebhookDelivery>;
}

/// Request body sent for an event.
pub fn request_body(event: &GeneratedEvent) -> serde_json::Value {
    serde_json::json!({
        "id": event.id,
        "type": event.kind,
        "environment_id": event.environment_id,
        "created_at": event.created_at,
        "data": event.payload,
    })
}

/// Headers sent for an event: the target's own headers plus the sandbox
/// identification headers.
pub fn request_headers(
    target: &WebhookTarget,
    event: &GeneratedEvent,
    delivery_id: &str,
) -> BTreeMap<String, String> {
    let mut headers = target.headers.clone();
    headers.insert("content-type".to_string(), "application/json".to_string());
    headers.insert(EVENT_HEADER.to_string(), event.id.clone());
    headers.insert(EVENT_KIND_HEADER.to_string(), event.kind.to_string());
    headers.insert(DELIVERY_HEADER.to_string(), delivery_id.to_string());
    headers
}

/// Transport that records every delivery as a simulated `200`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedTransport;

#[async_trait]
impl WebhookTransport for SimulatedTransport {
    async fn deliver(
        &self,
        target: &WebhookTarget,
        event: &GeneratedEvent,
    ) -> Result<WebhookDelivery> {
        let id = format!("dlv_{}", Uuid::new_v4().simple());
        Ok(WebhookDelivery {
            request_headers: request_headers(target, event, &id),
            request_body: request_body(event),
            id,
            event_id: event.id.clone(),
            url: target.url.clone(),
            status: DeliveryStatus::Simulated,
            response_status: 200,
            response_body: Some(serde_json::json!({ "received": true })),
            delivered_at: Some(Utc::now()),
        })
    }
}
