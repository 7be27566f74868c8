//! Error injection
//!
//! A policy is consulted once per job before fetching, and, when
//! `invalid_field_rate` is set, once per fetched record. Every decision is
//! a draw from the shared generator stream, so a seeded run is repeatable.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sim_core::{Record, IDENTIFIER_FIELDS};

/// Error type for malformed injection policies.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InjectionError {
    /// A rate is not a percentage
    #[error("{field} {rate} is not between 0 and 100")]
    RateOutOfRange { field: &'static str, rate: f64 },
}

/// Upstream failures a connector can be made to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum InjectedErrorKind {
    Timeout,
    RateLimit,
    AuthFailure,
    NetworkError,
    ServerError,
    InvalidResponse,
}

impl InjectedErrorKind {
    pub const ALL: [InjectedErrorKind; 6] = [
        InjectedErrorKind::Timeout,
        InjectedErrorKind::RateLimit,
        InjectedErrorKind::AuthFailure,
        InjectedErrorKind::NetworkError,
        InjectedErrorKind::ServerError,
        InjectedErrorKind::InvalidResponse,
    ];

    /// Error code reported in job results (`TIMEOUT`, `RATE_LIMIT`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            InjectedErrorKind::Timeout => "TIMEOUT",
            InjectedErrorKind::RateLimit => "RATE_LIMIT",
            InjectedErrorKind::AuthFailure => "AUTH_FAILURE",
            InjectedErrorKind::NetworkError => "NETWORK_ERROR",
            InjectedErrorKind::ServerError => "SERVER_ERROR",
            InjectedErrorKind::InvalidResponse => "INVALID_RESPONSE",
        }
    }

    /// Message describing the simulated failure for `connector_id`.
    pub fn message(&self, connector_id: &str) -> String {
        match self {
            InjectedErrorKind::Timeout => {
                format!("Request to {connector_id} timed out after 30000ms")
            }
            InjectedErrorKind::RateLimit => {
                format!("{connector_id} rejected the request: rate limit exceeded (429)")
            }
            InjectedErrorKind::AuthFailure => {
                format!("{connector_id} rejected the credentials (401)")
            }
            InjectedErrorKind::NetworkError => {
                format!("Connection to {connector_id} was reset")
            }
            InjectedErrorKind::ServerError => {
                format!("{connector_id} returned an internal server error (500)")
            }
            InjectedErrorKind::InvalidResponse => {
                format!("{connector_id} returned a response that could not be parsed")
            }
        }
    }
}

/// Failure simulation settings for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInjectionPolicy {
    #[serde(default)]
    pub enabled: bool,

    /// Percentage (0-100) of runs that fail before fetching
    #[serde(default)]
    pub failure_rate: f64,

    /// Kinds to choose from; empty means every kind
    #[serde(default)]
    pub error_kinds: Vec<InjectedErrorKind>,

    /// Percentage (0-100) of fetched records whose identifiers are stripped
    #[serde(default)]
    pub invalid_field_rate: f64,
}

impl ErrorInjectionPolicy {
    /// An enabled policy failing `failure_rate` percent of runs.
    pub fn failing(failure_rate: f64) -> Self {
        Self {
            enabled: true,
            failure_rate,
            error_kinds: Vec::new(),
            invalid_field_rate: 0.0,
        }
    }

    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = InjectedErrorKind>) -> Self {
        self.error_kinds = kinds.into_iter().collect();
        self
    }

    pub fn with_invalid_field_rate(mut self, rate: f64) -> Self {
        self.invalid_field_rate = rate;
        self
    }

    /// Check that both rates are percentages.
    pub fn validate(&self) -> Result<(), InjectionError> {
        for (field, rate) in [
            ("failure_rate", self.failure_rate),
            ("invalid_field_rate", self.invalid_field_rate),
        ] {
            if !(0.0..=100.0).contains(&rate) {
                return Err(InjectionError::RateOutOfRange { field, rate });
            }
        }
        Ok(())
    }

    /// Whether a draw in `[0, 1)` triggers a run failure.
    pub fn should_fail(&self, draw: f64) -> bool {
        self.enabled && draw * 100.0 < self.failure_rate
    }

    /// Whether records need a corruption draw at all.
    pub fn corrupts_records(&self) -> bool {
        self.enabled && self.invalid_field_rate > 0.0
    }

    /// Whether a draw in `[0, 1)` corrupts one record.
    pub fn should_corrupt(&self, draw: f64) -> bool {
        self.enabled && draw * 100.0 < self.invalid_field_rate
    }

    /// Choose the injected kind from a draw in `[0, 1)`.
    pub fn pick_kind(&self, draw: f64) -> InjectedErrorKind {
        let kinds: &[InjectedErrorKind] = if self.error_kinds.is_empty() {
            &InjectedErrorKind::ALL
        } else {
            &self.error_kinds
        };
        let index = ((draw * kinds.len() as f64) as usize).min(kinds.len() - 1);
        kinds[index]
    }
}

/// Remove every identifier field so the record fails the shape check.
pub fn strip_identifiers(record: &mut Record) {
    for field in IDENTIFIER_FIELDS {
        record.fields.remove(field);
    }
}
