//! Position layout. The security cycles through [`TICKERS`] by batch index.

use super::{format_date, round2, SynthContext, TICKERS};
use sim_core::{EntityKind, Record};

/// Draws consumed per record.
pub const DRAWS_PER_RECORD: u64 = 5;

pub fn synthesize(ctx: &mut SynthContext<'_>) -> Record {
    let position_id = format!("pos_{}", ctx.id_suffix());
    let account_id = ctx.account_id();
    let quantity = ctx.lcg.range_i64(10, 5000);
    let price = round2(ctx.lcg.range_f64(10.0, 900.0));
    let cost_factor = ctx.lcg.range_f64(0.6, 1.4);

    let ticker_index = (ctx.index % TICKERS.len() as u64) as usize;
    let security_id = TICKERS.get(ticker_index).copied().unwrap_or_default();
    let market_value = round2(quantity as f64 * price);
    let cost_basis = round2(market_value * cost_factor);

    Record::builder(EntityKind::Position, ctx.index)
        .field("position_id", position_id)
        .field("account_id", account_id)
        .field("security_id", security_id)
        .field("quantity", quantity)
        .field("price", price)
        .field("market_value", market_value)
        .field("cost_basis", cost_basis)
        .field("unrealized_gain", round2(market_value - cost_basis))
        .field("currency", "USD")
        .field("as_of_date", format_date(ctx.base_date))
        .build()
}
