//! Type-aware field extraction: merchant, date and total.

use lazy_static::lazy_static;
use regex::Regex;

use super::rules::patterns::{keyword_pattern, AMOUNT_TOKEN, DATE_NUMERIC, DATE_WORDS, GROUPED_AMOUNT};
use super::rules::{extract_date, AmountExtractor, KeywordRuleSet, BANK_RULES, RECEIPT_RULES};
use super::LineBlock;
use crate::models::receipt::{DocumentType, ExtractedField, Provenance};

lazy_static! {
    // Header and address hints that end the merchant name
    static ref MERCHANT_STOP_HINTS: Vec<Regex> = [
        "struk", "receipt", "invoice", "tanggal", "date", "kasir", "cashier", "telp", "phone",
    ]
    .iter()
    .map(|s| keyword_pattern(s))
    .collect();

    static ref ADDRESS_HINT: Regex = Regex::new(r"(?i)\b(?:jl|jln|jalan|no)\b\.?").unwrap();
}

/// Per-type extraction capabilities.
impl DocumentType {
    /// Whether a merchant name is read from the header lines.
    pub fn extracts_merchant(&self) -> bool {
        !matches!(self, Self::BankProof)
    }

    /// Keyword priorities and exclusions for the amount.
    pub fn amount_rules(&self) -> &'static KeywordRuleSet {
        match self {
            Self::BankProof => &BANK_RULES,
            Self::Receipt | Self::Unknown => &RECEIPT_RULES,
        }
    }
}

/// Extracted fields before the confidence and reply are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub merchant: ExtractedField<String>,
    pub date: ExtractedField<chrono::NaiveDate>,
    pub amount: ExtractedField<u64>,
}

/// Run every field extractor that applies to `doc_type`.
pub fn extract_fields(
    block: &LineBlock,
    doc_type: DocumentType,
    amounts: &AmountExtractor,
    merchant_lines: usize,
) -> ExtractedFields {
    let merchant = if doc_type.extracts_merchant() {
        extract_merchant(block, merchant_lines)
    } else {
        ExtractedField::missing()
    };

    let date = ExtractedField::from_option(
        extract_date(block.lines()).map(|m| m.value),
        Provenance::MatchedKeyword,
    );

    let amount = doc_type.amount_rules().find_amount(block.lines(), amounts);

    ExtractedFields {
        merchant,
        date,
        amount,
    }
}

/// Join the leading lines up to the first amount, date or keyword line.
pub fn extract_merchant(block: &LineBlock, max_lines: usize) -> ExtractedField<String> {
    let name = block
        .iter()
        .take(max_lines)
        .take_while(|line| !ends_merchant(line))
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        ExtractedField::missing()
    } else {
        ExtractedField::matched(name)
    }
}

fn ends_merchant(line: &str) -> bool {
    looks_like_amount_line(line)
        || DATE_NUMERIC.is_match(line)
        || DATE_WORDS.is_match(line)
        || RECEIPT_RULES.matches_keyword(line)
        || BANK_RULES.matches_keyword(line)
        || MERCHANT_STOP_HINTS.iter().any(|p| p.is_match(line))
        || ADDRESS_HINT.is_match(line)
}

fn looks_like_amount_line(line: &str) -> bool {
    if GROUPED_AMOUNT.is_match(line) {
        return true;
    }
    let lower = line.to_lowercase();
    if AMOUNT_TOKEN.find_iter(&lower).any(|m| m.as_str().starts_with("rp")) {
        return true;
    }
    let letters = line.chars().filter(|c| c.is_alphabetic()).count();
    let digits = line.chars().filter(|c| c.is_ascii_digit()).count();
    digits > 0 && digits >= letters
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn block(lines: &[&str]) -> LineBlock {
        LineBlock::new(lines)
    }

    #[test]
    fn test_merchant_joins_header_lines() {
        let b = block(&["KOPI KENANGAN", "Grand Indonesia", "12/03/2024 10:11", "Total 25.000"]);
        assert_eq!(
            extract_merchant(&b, 3),
            ExtractedField::matched("KOPI KENANGAN Grand Indonesia".to_string())
        );
    }

    #[test]
    fn test_merchant_stops_at_address() {
        let b = block(&["INDOMARET", "Jl. Sudirman No. 5", "Aqua 4.000"]);
        assert_eq!(extract_merchant(&b, 3).value, Some("INDOMARET".to_string()));
    }

    #[test]
    fn test_merchant_limited_to_leading_lines() {
        let b = block(&["A B C", "D E F", "G H I", "J K L"]);
        assert_eq!(extract_merchant(&b, 3).value, Some("A B C D E F G H I".to_string()));
    }

    #[test]
    fn test_merchant_missing_when_first_line_is_amount() {
        let b = block(&["Rp 45.000", "Toko"]);
        assert!(extract_merchant(&b, 3).is_missing());
    }

    #[test]
    fn test_bank_proof_has_no_merchant() {
        let b = block(&["Transfer Berhasil", "Nominal Rp 150.000", "05/01/2025"]);
        let fields = extract_fields(&b, DocumentType::BankProof, &AmountExtractor::default(), 3);

        assert!(fields.merchant.is_missing());
        assert_eq!(fields.amount, ExtractedField::matched(150_000));
        assert_eq!(
            fields.date,
            ExtractedField::matched(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap())
        );
    }

    #[test]
    fn test_receipt_fields() {
        let b = block(&[
            "WARUNG BU SRI",
            "Tgl: 13/02/26",
            "Nasi Rames 20.000",
            "Es Teh 5.000",
            "TOTAL 25.000",
            "TUNAI 50.000",
            "KEMBALIAN 25.000",
        ]);
        let fields = extract_fields(&b, DocumentType::Receipt, &AmountExtractor::default(), 3);

        assert_eq!(fields.merchant.value, Some("WARUNG BU SRI".to_string()));
        assert_eq!(fields.date.value, NaiveDate::from_ymd_opt(2026, 2, 13));
        assert_eq!(fields.amount, ExtractedField::matched(25_000));
    }
}
