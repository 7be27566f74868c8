//! Per-entity record synthesizers.
//!
//! Each submodule synthesizes one entity layout and consumes exactly
//! `DRAWS_PER_RECORD` draws from the stream per record, so a batch of `n`
//! records always advances the LCG by `n * DRAWS_PER_RECORD`.

pub mod account;
pub mod contact;
pub mod document;
pub mod invoice;
pub mod position;
pub mod price;
pub mod tax_lot;
pub mod transaction;

use crate::lcg::Lcg;
use chrono::{Days, NaiveDate};
use sim_core::{EntityKind, Record};

/// Ticker table shared by every security-bearing layout.
pub const TICKERS: [&str; 10] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "JPM", "V", "BRK.B",
];

/// Currencies used for non-position amounts.
pub const CURRENCIES: [&str; 4] = ["USD", "EUR", "GBP", "CHF"];

/// Date format used for every generated date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Mutable state handed to a synthesizer for one record.
pub struct SynthContext<'a> {
    /// Shared draw stream
    pub lcg: &'a mut Lcg,
    /// Index of the record within its batch
    pub index: u64,
    /// Date all generated dates are offset from
    pub base_date: NaiveDate,
}

impl SynthContext<'_> {
    /// Pick a string from a constant table.
    pub fn pick(&mut self, table: &[&'static str]) -> &'static str {
        self.lcg.pick(table).copied().unwrap_or_default()
    }

    /// Draw an 8-digit identifier suffix.
    pub fn id_suffix(&mut self) -> String {
        format!("{:08}", self.lcg.next_u31() % 100_000_000)
    }

    /// Draw a custodial account id.
    pub fn account_id(&mut self) -> String {
        format!("ACC-{}", self.lcg.range_i64(1000, 1999))
    }

    /// Draw a number of days in `0..=max_days` and return the date that many days
    /// before the base date.
    pub fn date_within(&mut self, max_days: i64) -> NaiveDate {
        let offset = self.lcg.range_i64(0, max_days);
        days_before(self.base_date, offset)
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `base - days`, clamped to `base` when out of range.
pub fn days_before(base: NaiveDate, days: i64) -> NaiveDate {
    base.checked_sub_days(Days::new(days.unsigned_abs()))
        .unwrap_or(base)
}

/// `base + days`, clamped to `base` when out of range.
pub fn days_after(base: NaiveDate, days: u64) -> NaiveDate {
    base.checked_add_days(Days::new(days)).unwrap_or(base)
}

/// Format a date with [`DATE_FORMAT`].
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Synthesize one record of the given kind.
pub fn synthesize(kind: EntityKind, ctx: &mut SynthContext<'_>) -> Record {
    match kind {
        EntityKind::Transaction | EntityKind::Trade | EntityKind::Activity => {
            transaction::synthesize(kind, ctx)
        }
        EntityKind::Position => position::synthesize(ctx),
        EntityKind::Invoice => invoice::synthesize(ctx),
        EntityKind::Account => account::synthesize(ctx),
        EntityKind::Contact => contact::synthesize(ctx),
        EntityKind::Document => document::synthesize(ctx),
        EntityKind::Price => price::synthesize(ctx),
        EntityKind::TaxLot => tax_lot::synthesize(ctx),
    }
}

/// Number of draws one record of `kind` consumes.
pub fn draws_per_record(kind: EntityKind) -> u64 {
    match kind {
        EntityKind::Transaction | EntityKind::Trade | EntityKind::Activity => {
            transaction::DRAWS_PER_RECORD
        }
        EntityKind::Position => position::DRAWS_PER_RECORD,
        EntityKind::Invoice => invoice::DRAWS_PER_RECORD,
        EntityKind::Account => account::DRAWS_PER_RECORD,
        EntityKind::Contact => contact::DRAWS_PER_RECORD,
        EntityKind::Document => document::DRAWS_PER_RECORD,
        EntityKind::Price => price::DRAWS_PER_RECORD,
        EntityKind::TaxLot => tax_lot::DRAWS_PER_RECORD,
    }
}
