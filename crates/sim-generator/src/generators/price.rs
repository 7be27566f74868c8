//! Daily price bar layout.

use super::{format_date, round2, SynthContext, TICKERS};
use sim_core::{EntityKind, Record};

/// Draws consumed per record.
pub const DRAWS_PER_RECORD: u64 = 8;

pub fn synthesize(ctx: &mut SynthContext<'_>) -> Record {
    let id = format!("px_{}", ctx.id_suffix());
    let security_id = ctx.pick(&TICKERS);
    let close = round2(ctx.lcg.range_f64(10.0, 900.0));
    let open_move = ctx.lcg.range_f64(-0.03, 0.03);
    let high_move = ctx.lcg.range_f64(0.0, 0.02);
    let low_move = ctx.lcg.range_f64(0.0, 0.02);
    let volume = ctx.lcg.range_i64(100_000, 50_000_000);
    let price_date = ctx.date_within(30);

    let open = round2(close * (1.0 + open_move));
    let high = round2(open.max(close) * (1.0 + high_move));
    let low = round2(open.min(close) * (1.0 - low_move));

    Record::builder(EntityKind::Price, ctx.index)
        .field("id", id)
        .field("security_id", security_id)
        .field("price_date", format_date(price_date))
        .field("open", open)
        .field("high", high)
        .field("low", low)
        .field("close", close)
        .field("volume", volume)
        .field("currency", "USD")
        .build()
}
