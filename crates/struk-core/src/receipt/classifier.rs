//! Document type classification.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::rules::patterns::{keyword_pattern, ITEM_PRICE_LINE};
use super::LineBlock;
use crate::models::receipt::DocumentType;

lazy_static! {
    static ref BANK_SIGNALS: Vec<Regex> = [
        "transfer",
        "debit",
        "qris",
        "nominal",
        "rekening",
        "penerima",
        "virtual account",
        "m-banking",
        "mobile banking",
        "internet banking",
    ]
    .iter()
    .map(|s| keyword_pattern(s))
    .collect();

    static ref RETAIL_SIGNALS: Vec<Regex> = [
        "total",
        "struk",
        "subtotal",
        "kasir",
        "receipt",
        "ppn",
        "qty",
    ]
    .iter()
    .map(|s| keyword_pattern(s))
    .collect();
}

/// Decide whether a block is a receipt or a transfer proof.
///
/// Bank signals win over retail ones: transfer proofs often print "total"
/// as well.
pub fn classify(block: &LineBlock) -> DocumentType {
    if let Some(line) = block
        .iter()
        .find(|line| BANK_SIGNALS.iter().any(|p| p.is_match(line)))
    {
        debug!("Bank signal in {:?}", line);
        return DocumentType::BankProof;
    }

    let retail = block.iter().any(|line| {
        RETAIL_SIGNALS.iter().any(|p| p.is_match(line)) || ITEM_PRICE_LINE.is_match(line)
    });

    if retail {
        DocumentType::Receipt
    } else {
        DocumentType::Unknown
    }
}
