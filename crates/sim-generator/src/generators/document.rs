//! Document layout.

use super::{format_date, SynthContext};
use sim_core::{EntityKind, Record};

/// Draws consumed per record.
pub const DRAWS_PER_RECORD: u64 = 6;

const DOCUMENT_TYPES: [&str; 6] = [
    "statement",
    "tax_form",
    "capital_call_notice",
    "distribution_notice",
    "k1",
    "subscription_agreement",
];
const EXTENSIONS: [&str; 4] = ["pdf", "xlsx", "csv", "docx"];

fn mime_type(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "csv" => "text/csv",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

pub fn synthesize(ctx: &mut SynthContext<'_>) -> Record {
    let id = format!("doc_{}", ctx.id_suffix());
    let document_type = ctx.pick(&DOCUMENT_TYPES);
    let extension = ctx.pick(&EXTENSIONS);
    let size_bytes = ctx.lcg.range_i64(10_000, 5_000_000);
    let uploaded = ctx.date_within(365);
    let account_id = ctx.account_id();

    Record::builder(EntityKind::Document, ctx.index)
        .field("id", id)
        .field(
            "file_name",
            format!("{document_type}_{}.{extension}", uploaded.format("%Y%m%d")),
        )
        .field("document_type", document_type)
        .field("mime_type", mime_type(extension))
        .field("size_bytes", size_bytes)
        .field("uploaded_at", format_date(uploaded))
        .field("account_id", account_id)
        .build()
}
