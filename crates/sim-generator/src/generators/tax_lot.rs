//! Tax lot layout.

use super::{days_before, format_date, round2, SynthContext, TICKERS};
use sim_core::{EntityKind, Record};

/// Draws consumed per record.
pub const DRAWS_PER_RECORD: u64 = 6;

/// Holding period after which a lot is long-term.
const LONG_TERM_DAYS: i64 = 365;

pub fn synthesize(ctx: &mut SynthContext<'_>) -> Record {
    let id = format!("lot_{}", ctx.id_suffix());
    let account_id = ctx.account_id();
    let security_id = ctx.pick(&TICKERS);
    let quantity = ctx.lcg.range_i64(1, 2000);
    let cost_per_share = round2(ctx.lcg.range_f64(5.0, 700.0));
    let held_days = ctx.lcg.range_i64(0, 1500);

    let term = if held_days > LONG_TERM_DAYS {
        "long_term"
    } else {
        "short_term"
    };

    Record::builder(EntityKind::TaxLot, ctx.index)
        .field("id", id)
        .field("account_id", account_id)
        .field("security_id", security_id)
        .field(
            "acquisition_date",
            format_date(days_before(ctx.base_date, held_days)),
        )
        .field("quantity", quantity)
        .field("cost_per_share", cost_per_share)
        .field("cost_basis", round2(quantity as f64 * cost_per_share))
        .field("term", term)
        .build()
}
