//! Transaction layout, shared by the `trade` and `activity` aliases.

use super::{days_after, format_date, round2, SynthContext, TICKERS};
use sim_core::{EntityKind, Record};

/// Draws consumed per record.
pub const DRAWS_PER_RECORD: u64 = 8;

const TXN_TYPES: [&str; 5] = ["BUY", "SELL", "DIVIDEND", "INTEREST", "FEE"];
const STATUSES: [&str; 3] = ["settled", "pending", "cancelled"];

/// Settlement lag in days (T+2).
const SETTLEMENT_DAYS: u64 = 2;

pub fn synthesize(kind: EntityKind, ctx: &mut SynthContext<'_>) -> Record {
    let txn_id = format!("txn_{}", ctx.id_suffix());
    let account_id = ctx.account_id();
    let security_id = ctx.pick(&TICKERS);
    let txn_type = ctx.pick(&TXN_TYPES);
    let quantity = ctx.lcg.range_i64(1, 1000);
    let price = round2(ctx.lcg.range_f64(5.0, 500.0));
    let trade_date = ctx.date_within(364);
    let status = ctx.pick(&STATUSES);

    let gross = round2(quantity as f64 * price);
    let amount = if txn_type == "BUY" || txn_type == "FEE" {
        -gross
    } else {
        gross
    };

    Record::builder(kind, ctx.index)
        .field("txn_id", txn_id)
        .field("account_id", account_id)
        .field("security_id", security_id)
        .field("txn_type", txn_type)
        .field("quantity", quantity)
        .field("price", price)
        .field("amount", amount)
        .field("currency", "USD")
        .field("trade_date", format_date(trade_date))
        .field(
            "settle_date",
            format_date(days_after(trade_date, SETTLEMENT_DAYS)),
        )
        .field("status", status)
        .build()
}
