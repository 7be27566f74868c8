//! Invoice layout.

use super::{days_after, format_date, round2, SynthContext, CURRENCIES};
use sim_core::{EntityKind, Record};

/// Draws consumed per record.
pub const DRAWS_PER_RECORD: u64 = 8;

const VENDORS: [&str; 6] = [
    "Northwind Fund Admin",
    "Harbor Legal LLP",
    "Summit Audit Partners",
    "Bluebird Custody",
    "Atlas Data Services",
    "Keystone Tax Advisors",
];
const STATUSES: [&str; 4] = ["draft", "sent", "paid", "overdue"];

/// Net payment terms in days.
const PAYMENT_TERMS_DAYS: u64 = 30;

pub fn synthesize(ctx: &mut SynthContext<'_>) -> Record {
    let id = format!("inv_{}", ctx.id_suffix());
    let number = ctx.lcg.range_i64(1, 99_999);
    let vendor = ctx.pick(&VENDORS);
    let amount = round2(ctx.lcg.range_f64(100.0, 25_000.0));
    let currency = ctx.pick(&CURRENCIES);
    let issue_date = ctx.date_within(180);
    let status = ctx.pick(&STATUSES);
    let line_items = ctx.lcg.range_i64(1, 10);

    Record::builder(EntityKind::Invoice, ctx.index)
        .field("id", id)
        .field("invoice_number", format!("INV-2024-{number:05}"))
        .field("vendor", vendor)
        .field("amount", amount)
        .field("currency", currency)
        .field("issue_date", format_date(issue_date))
        .field(
            "due_date",
            format_date(days_after(issue_date, PAYMENT_TERMS_DAYS)),
        )
        .field("status", status)
        .field("line_item_count", line_items)
        .build()
}
