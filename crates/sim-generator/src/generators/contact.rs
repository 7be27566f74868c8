//! Contact layout.

use super::SynthContext;
use sim_core::{EntityKind, Record};

/// Draws consumed per record.
pub const DRAWS_PER_RECORD: u64 = 7;

const FIRST_NAMES: [&str; 8] = [
    "Amara", "Jonas", "Priya", "Mateo", "Ingrid", "Kwame", "Sofia", "Declan",
];
const LAST_NAMES: [&str; 8] = [
    "Okafor", "Lindqvist", "Raman", "Alvarez", "Novak", "Mensah", "Rossi", "Byrne",
];
const DOMAINS: [&str; 4] = [
    "example.com",
    "sandbox.test",
    "fundadmin.example",
    "familyoffice.example",
];
const ROLES: [&str; 5] = ["investor", "advisor", "accountant", "attorney", "trustee"];
const COMPANIES: [&str; 4] = [
    "Castellan Partners",
    "Okafor Holdings",
    "Harbor Legal LLP",
    "Summit Audit Partners",
];

pub fn synthesize(ctx: &mut SynthContext<'_>) -> Record {
    let id = format!("ctc_{}", ctx.id_suffix());
    let first = ctx.pick(&FIRST_NAMES);
    let last = ctx.pick(&LAST_NAMES);
    let domain = ctx.pick(&DOMAINS);
    let line = ctx.lcg.range_i64(2_000_000, 9_999_999);
    let role = ctx.pick(&ROLES);
    let company = ctx.pick(&COMPANIES);

    Record::builder(EntityKind::Contact, ctx.index)
        .field("id", id)
        .field("first_name", first)
        .field("last_name", last)
        .field(
            "email",
            format!("{}.{}@{domain}", first.to_lowercase(), last.to_lowercase()),
        )
        .field("phone", format!("+1-555-{:03}-{:04}", line / 10_000, line % 10_000))
        .field("role", role)
        .field("company", company)
        .build()
}
