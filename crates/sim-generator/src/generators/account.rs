//! Account layout.

use super::{format_date, SynthContext, CURRENCIES};
use sim_core::{EntityKind, Record};

/// Draws consumed per record.
pub const DRAWS_PER_RECORD: u64 = 8;

const OWNERS: [&str; 6] = [
    "Whitmore Family Trust",
    "Castellan Partners",
    "Okafor Holdings",
    "Lindqvist Foundation",
    "Marsh & Vale",
    "Ridgeview Endowment",
];
const ACCOUNT_TYPES: [&str; 5] = ["brokerage", "custody", "ira", "trust", "operating"];
const CUSTODIANS: [&str; 4] = ["Schwab", "Fidelity", "BNY Mellon", "State Street"];
const STATUSES: [&str; 3] = ["active", "active", "closed"];

pub fn synthesize(ctx: &mut SynthContext<'_>) -> Record {
    let id = format!("acct_{}", ctx.id_suffix());
    let number = ctx.lcg.range_i64(10_000_000, 99_999_999);
    let owner = ctx.pick(&OWNERS);
    let account_type = ctx.pick(&ACCOUNT_TYPES);
    let custodian = ctx.pick(&CUSTODIANS);
    let currency = ctx.pick(&CURRENCIES);
    let opened = ctx.date_within(3650);
    let status = ctx.pick(&STATUSES);

    Record::builder(EntityKind::Account, ctx.index)
        .field("id", id)
        .field("account_number", number.to_string())
        .field("name", format!("{owner} {account_type}"))
        .field("account_type", account_type)
        .field("custodian", custodian)
        .field("base_currency", currency)
        .field("opened_date", format_date(opened))
        .field("status", status)
        .build()
}
