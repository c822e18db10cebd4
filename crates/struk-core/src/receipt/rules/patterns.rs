//! Common regex patterns for Indonesian receipts and transfer proofs.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Amount token: optional Rp/IDR prefix, digit run with separators,
    // optional colloquial multiplier ("25rb", "1,5jt", "Rp 89.000")
    pub static ref AMOUNT_TOKEN: Regex = Regex::new(
        r"(?i)(?:\b(?:rp|idr)\.?\s*|\b)[0-9][0-9.,]*(?:\s*(?:ribu|rb|juta|jt|k)\b)?"
    ).unwrap();

    // Whole-token shapes used by the normalizer
    pub static ref PLAIN_INTEGER: Regex = Regex::new(
        r"^([0-9]+)(?:[.,][0-9]{2})?$"
    ).unwrap();

    pub static ref GROUPED_INTEGER: Regex = Regex::new(
        r"^([0-9]{1,3}(?:[.,][0-9]{3})+)(?:[.,][0-9]{2})?$"
    ).unwrap();

    // Grouped amount anywhere in a line ("89.000", "1,250,000")
    pub static ref GROUPED_AMOUNT: Regex = Regex::new(
        r"\b[0-9]{1,3}(?:[.,][0-9]{3})+\b"
    ).unwrap();

    // Item line: some words followed by a grouped price at the end
    pub static ref ITEM_PRICE_LINE: Regex = Regex::new(
        r"(?i)^.*[a-z]{2,}.*\s(?:rp\.?\s*)?[0-9]{1,3}(?:[.,][0-9]{3})+(?:[.,][0-9]{2})?$"
    ).unwrap();

    // Dates: DD/MM/YY, DD/MM/YYYY, DD-MM-YYYY, DD-MM-YY
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b([0-9]{1,2})([/-])([0-9]{1,2})([/-])([0-9]{4}|[0-9]{2})\b"
    ).unwrap();

    // Dates with month names: "12 Feb 2024", "3 Agustus 25"
    pub static ref DATE_WORDS: Regex = Regex::new(
        r"(?i)\b([0-9]{1,2})\s+(jan|feb|mar|apr|mei|may|jun|jul|agu|aug|sep|okt|oct|nov|des|dec)[a-z]*\.?\s+([0-9]{4}|[0-9]{2})\b"
    ).unwrap();

    // Clock time, masked out before amount scanning
    pub static ref CLOCK_TIME: Regex = Regex::new(
        r"(?i)\b[0-9]{1,2}:[0-9]{2}(?::[0-9]{2})?\b|\b[0-9]{1,2}\.[0-9]{2}\s*(?:wib|wita|wit)\b"
    ).unwrap();
}

/// Build a case-insensitive, word-bounded pattern for a keyword phrase.
///
/// Spaces in the phrase match any run of whitespace.
pub fn keyword_pattern(phrase: &str) -> Regex {
    let body = phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    Regex::new(&format!(r"(?i)\b{}\b", body)).unwrap()
}
