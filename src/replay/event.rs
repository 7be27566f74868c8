//! Domain events and their payload synthesizers
//!
//! Payloads use unseeded randomness. They only need to look plausible to a
//! webhook consumer; nothing downstream depends on their exact values.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when parsing an unknown event name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown event kind: {0}")]
pub struct UnknownEventKind(pub String);

/// The fixed table of replayable domain events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "invoice.paid")]
    InvoicePaid,
    #[serde(rename = "invoice.created")]
    InvoiceCreated,
    #[serde(rename = "sync.completed")]
    SyncCompleted,
    #[serde(rename = "sync.failed")]
    SyncFailed,
    #[serde(rename = "risk.breach")]
    RiskBreach,
    #[serde(rename = "document.uploaded")]
    DocumentUploaded,
    #[serde(rename = "position.changed")]
    PositionChanged,
    #[serde(rename = "capital_call.due")]
    CapitalCallDue,
    #[serde(rename = "distribution.received")]
    DistributionReceived,
    #[serde(rename = "webhook.test")]
    WebhookTest,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::InvoicePaid,
        EventKind::InvoiceCreated,
        EventKind::SyncCompleted,
        EventKind::SyncFailed,
        EventKind::RiskBreach,
        EventKind::DocumentUploaded,
        EventKind::PositionChanged,
        EventKind::CapitalCallDue,
        EventKind::DistributionReceived,
        EventKind::WebhookTest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::InvoicePaid => "invoice.paid",
            EventKind::InvoiceCreated => "invoice.created",
            EventKind::SyncCompleted => "sync.completed",
            EventKind::SyncFailed => "sync.failed",
            EventKind::RiskBreach => "risk.breach",
            EventKind::DocumentUploaded => "document.uploaded",
            EventKind::PositionChanged => "position.changed",
            EventKind::CapitalCallDue => "capital_call.due",
            EventKind::DistributionReceived => "distribution.received",
            EventKind::WebhookTest => "webhook.test",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// One synthesized event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedEvent {
    pub id: String,
    pub kind: EventKind,
    pub environment_id: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl GeneratedEvent {
    /// Synthesize a new event of `kind` with a random payload.
    pub fn synthesize(kind: EventKind, environment_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: format!("evt_{}", Uuid::new_v4().simple()),
            kind,
            environment_id: environment_id.to_string(),
            payload: synthesize_payload(kind, &mut rand::rng(), now),
            created_at: now,
        }
    }
}

const CUSTOMERS: [&str; 5] = [
    "Northwind Capital",
    "Harbor Family Office",
    "Alder Street Partners",
    "Bluegate Trust",
    "Meridian Endowment",
];
const CONNECTORS: [&str; 4] = ["custodian_mock", "crm_mock", "erp_mock", "bank_feed_mock"];
const TICKERS: [&str; 6] = ["AAPL", "MSFT", "NVDA", "JPM", "V", "BRK.B"];
const FUNDS: [&str; 3] = ["Growth Fund III", "Credit Opportunities II", "Real Assets I"];
const DOCUMENT_TYPES: [&str; 4] = ["statement", "k1", "capital_call_notice", "subscription"];
const RISK_METRICS: [&str; 3] = ["concentration", "var_95", "leverage"];
const SYNC_ERRORS: [&str; 3] = ["TIMEOUT", "RATE_LIMIT", "AUTH_FAILURE"];

fn pick<R: Rng>(rng: &mut R, table: &[&'static str]) -> &'static str {
    table[rng.random_range(0..table.len())]
}

fn amount<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    (rng.random_range(min..max) * 100.0).round() / 100.0
}

fn short_id<R: Rng>(rng: &mut R, prefix: &str) -> String {
    format!("{prefix}-{:06}", rng.random_range(0..1_000_000))
}

fn due_date(now: DateTime<Utc>, days: i64) -> String {
    (now + Duration::days(days)).format("%Y-%m-%d").to_string()
}

/// Build the payload for one event kind.
pub fn synthesize_payload<R: Rng>(
    kind: EventKind,
    rng: &mut R,
    now: DateTime<Utc>,
) -> serde_json::Value {
    match kind {
        EventKind::InvoicePaid => json!({
            "invoice_id": short_id(rng, "INV"),
            "customer": pick(rng, &CUSTOMERS),
            "amount": amount(rng, 500.0, 50_000.0),
            "currency": "USD",
            "paid_at": now.to_rfc3339(),
            "payment_method": pick(rng, &["ach", "wire", "card"]),
        }),
        EventKind::InvoiceCreated => json!({
            "invoice_id": short_id(rng, "INV"),
            "customer": pick(rng, &CUSTOMERS),
            "amount": amount(rng, 500.0, 50_000.0),
            "currency": "USD",
            "due_date": due_date(now, rng.random_range(15..=60)),
        }),
        EventKind::SyncCompleted => {
            let processed = rng.random_range(10..=5_000);
            json!({
                "job_id": short_id(rng, "job"),
                "connector_id": pick(rng, &CONNECTORS),
                "records_processed": processed,
                "records_created": processed * 95 / 100,
                "duration_ms": rng.random_range(200..=30_000),
            })
        }
        EventKind::SyncFailed => json!({
            "job_id": short_id(rng, "job"),
            "connector_id": pick(rng, &CONNECTORS),
            "error_code": pick(rng, &SYNC_ERRORS),
            "retryable": rng.random_bool(0.7),
        }),
        EventKind::RiskBreach => {
            let limit = amount(rng, 0.05, 0.25);
            json!({
                "portfolio_id": short_id(rng, "PF"),
                "metric": pick(rng, &RISK_METRICS),
                "limit": limit,
                "observed": amount(rng, limit, limit * 2.0),
                "severity": pick(rng, &["warning", "critical"]),
            })
        }
        EventKind::DocumentUploaded => json!({
            "document_id": short_id(rng, "DOC"),
            "document_type": pick(rng, &DOCUMENT_TYPES),
            "file_name": format!("{}.pdf", short_id(rng, "upload")),
            "size_bytes": rng.random_range(10_000..=5_000_000),
        }),
        EventKind::PositionChanged => {
            let before = rng.random_range(0..=10_000);
            json!({
                "position_id": short_id(rng, "POS"),
                "security_id": pick(rng, &TICKERS),
                "quantity_before": before,
                "quantity_after": before + rng.random_range(-500..=500),
                "as_of": now.format("%Y-%m-%d").to_string(),
            })
        }
        EventKind::CapitalCallDue => json!({
            "call_id": short_id(rng, "CC"),
            "fund": pick(rng, &FUNDS),
            "amount": amount(rng, 10_000.0, 2_000_000.0),
            "due_date": due_date(now, rng.random_range(7..=30)),
        }),
        EventKind::DistributionReceived => json!({
            "distribution_id": short_id(rng, "DIST"),
            "fund": pick(rng, &FUNDS),
            "amount": amount(rng, 5_000.0, 750_000.0),
            "type": pick(rng, &["return_of_capital", "income", "gain"]),
        }),
        EventKind::WebhookTest => json!({
            "message": "This is a test webhook from the sandbox",
            "nonce": Uuid::new_v4().to_string(),
            "sent_at": now.to_rfc3339(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_kind() {
        assert_eq!("webhook.test".parse::<EventKind>().unwrap(), EventKind::WebhookTest);
        assert_eq!(
            " Capital_Call.Due ".parse::<EventKind>().unwrap(),
            EventKind::CapitalCallDue
        );
        assert_eq!(
            "invoice.void".parse::<EventKind>(),
            Err(UnknownEventKind("invoice.void".to_string()))
        );
    }

    #[test]
    fn test_serde_names_match_display() {
        for kind in EventKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
    }

    #[test]
    fn test_every_kind_has_an_object_payload() {
        let mut rng = rand::rng();
        for kind in EventKind::ALL {
            let payload = synthesize_payload(kind, &mut rng, Utc::now());
            let fields = payload.as_object().unwrap();
            assert!(!fields.is_empty(), "{kind} payload is empty");
        }
    }

    #[test]
    fn test_synthesize_event() {
        let event = GeneratedEvent::synthesize(EventKind::InvoicePaid, "env-1");
        assert!(event.id.starts_with("evt_"));
        assert_eq!(event.environment_id, "env-1");
        assert_eq!(event.payload["currency"], "USD");
        assert!(event.payload["amount"].as_f64().unwrap() >= 500.0);
    }
}
