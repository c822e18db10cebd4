//! Amount normalization for Rupiah values.
//!
//! Receipts report whole Rupiah, so every amount is a `u64`. Typed shorthand
//! ("25rb", "1,5jt") and grouped digits ("2.500.000") resolve to the same
//! canonical value.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::trace;

use super::patterns::{AMOUNT_TOKEN, CLOCK_TIME, DATE_NUMERIC, DATE_WORDS, GROUPED_INTEGER, PLAIN_INTEGER};
use super::{ExtractionMatch, FieldExtractor};
use crate::error::AmountError;

const MULTIPLIERS: [(&str, u64); 5] = [
    ("ribu", 1_000),
    ("rb", 1_000),
    ("juta", 1_000_000),
    ("jt", 1_000_000),
    ("k", 1_000),
];

/// Normalize a numeric token into whole Rupiah.
///
/// Currency markers and whitespace are ignored. A trailing multiplier reads
/// the number as a decimal (`2,5rb` is 2500); otherwise `.`/`,` are thousands
/// separators and a trailing two-digit group is a discarded fraction.
pub fn normalize_amount(token: &str) -> Result<u64, AmountError> {
    let cleaned = strip_currency(token);

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return Err(AmountError::NoDigits(token.to_string()));
    }

    let invalid = || AmountError::InvalidAmount(token.to_string());

    for (suffix, multiplier) in MULTIPLIERS {
        if let Some(number) = cleaned.strip_suffix(suffix) {
            return scale_shorthand(number, multiplier).ok_or_else(invalid);
        }
    }

    if !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return Err(invalid());
    }

    if let Some(caps) = PLAIN_INTEGER.captures(&cleaned) {
        return caps[1].parse().map_err(|_| invalid());
    }

    if let Some(caps) = GROUPED_INTEGER.captures(&cleaned) {
        let grouped = &caps[1];
        let mut separators = grouped.chars().filter(|c| *c == '.' || *c == ',');
        let first = separators.next();
        if separators.any(|c| Some(c) != first) {
            return Err(invalid());
        }
        let digits: String = grouped.chars().filter(|c| c.is_ascii_digit()).collect();
        return digits.parse().map_err(|_| invalid());
    }

    Err(invalid())
}

fn strip_currency(token: &str) -> String {
    let mut cleaned: String = token
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    for prefix in ["rp.", "rp", "idr", "$"] {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest.to_string();
            break;
        }
    }

    // "10.000,-" and sentence punctuation
    cleaned
        .trim_start_matches([':', '.'])
        .trim_end_matches(['-', '.', ','])
        .to_string()
}

fn scale_shorthand(number: &str, multiplier: u64) -> Option<u64> {
    if number.is_empty() || number.matches(['.', ',']).count() > 1 {
        return None;
    }
    let value = Decimal::from_str(&number.replace(',', ".")).ok()?;
    value.checked_mul(Decimal::from(multiplier))?.round().to_u64()
}

/// Format a whole-Rupiah amount for replies ("Rp89.000").
pub fn format_idr(amount: u64) -> String {
    let digits = amount.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    formatted.push_str("Rp");

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(c);
    }

    formatted
}

/// Accepted range for amounts scanned out of OCR text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountBounds {
    pub min: u64,
    pub max: u64,
}

impl Default for AmountBounds {
    fn default() -> Self {
        Self {
            min: 100,
            max: 2_000_000_000,
        }
    }
}

/// Scans lines for amount tokens.
#[derive(Debug, Clone, Default)]
pub struct AmountExtractor {
    bounds: AmountBounds,
}

impl AmountExtractor {
    pub fn new(bounds: AmountBounds) -> Self {
        Self { bounds }
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<u64>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let masked = mask_dates_and_times(text);
        let mut results = Vec::new();

        for m in AMOUNT_TOKEN.find_iter(&masked) {
            let token = m.as_str();
            if !is_plausible_token(token) {
                trace!("Skipping implausible amount token {:?}", token);
                continue;
            }
            match normalize_amount(token) {
                Ok(value) if (self.bounds.min..=self.bounds.max).contains(&value) => {
                    results.push(ExtractionMatch::new(value, token).with_position(m.start(), m.end()));
                }
                Ok(value) => trace!("Amount {} out of bounds", value),
                Err(e) => trace!("Rejected token: {}", e),
            }
        }

        results
    }
}

/// Blank out dates and clock times so their digits never become amounts.
fn mask_dates_and_times(text: &str) -> String {
    let mut masked = text.to_string();
    for pattern in [&*DATE_NUMERIC, &*DATE_WORDS, &*CLOCK_TIME] {
        let ranges: Vec<_> = pattern.find_iter(&masked).map(|m| m.range()).collect();
        for range in ranges {
            let blank = " ".repeat(range.len());
            masked.replace_range(range, &blank);
        }
    }
    masked
}

/// Reject long plain digit runs (reference, terminal and card numbers).
fn is_plausible_token(token: &str) -> bool {
    let lower = token.to_lowercase();
    let has_currency = lower.contains("rp") || lower.contains("idr");
    let has_suffix = MULTIPLIERS
        .iter()
        .any(|(suffix, _)| lower.trim_end().ends_with(suffix));
    let has_separator = lower.contains('.') || lower.contains(',');
    let digit_count = lower.chars().filter(|c| c.is_ascii_digit()).count();

    if has_suffix {
        return true;
    }
    if digit_count > 12 {
        return false;
    }
    has_currency || has_separator || digit_count < 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_shorthand() {
        assert_eq!(normalize_amount("25rb"), Ok(25_000));
        assert_eq!(normalize_amount("25 RB"), Ok(25_000));
        assert_eq!(normalize_amount("2,5rb"), Ok(2_500));
        assert_eq!(normalize_amount("15k"), Ok(15_000));
        assert_eq!(normalize_amount("1,5jt"), Ok(1_500_000));
        assert_eq!(normalize_amount("3 juta"), Ok(3_000_000));
    }

    #[test]
    fn test_normalize_grouped() {
        assert_eq!(normalize_amount("180.000"), Ok(180_000));
        assert_eq!(normalize_amount("89.000"), Ok(89_000));
        assert_eq!(normalize_amount("2.500.000"), Ok(2_500_000));
        assert_eq!(normalize_amount("1,250,000"), Ok(1_250_000));
        assert_eq!(normalize_amount("Rp 89.000"), Ok(89_000));
        assert_eq!(normalize_amount("Rp.10.000,-"), Ok(10_000));
        assert_eq!(normalize_amount("IDR 150.000"), Ok(150_000));
    }

    #[test]
    fn test_normalize_discards_two_digit_fraction() {
        assert_eq!(normalize_amount("89.000,00"), Ok(89_000));
        assert_eq!(normalize_amount("12,50"), Ok(12));
        assert_eq!(normalize_amount("95000"), Ok(95_000));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert_eq!(
            normalize_amount("Rp"),
            Err(AmountError::NoDigits("Rp".to_string()))
        );
        assert!(matches!(normalize_amount("1.2.3"), Err(AmountError::InvalidAmount(_))));
        assert!(matches!(normalize_amount("12.3456"), Err(AmountError::InvalidAmount(_))));
        assert!(matches!(normalize_amount("1.000,000"), Err(AmountError::InvalidAmount(_))));
        assert!(matches!(normalize_amount("12a4"), Err(AmountError::InvalidAmount(_))));
        assert!(matches!(
            normalize_amount("99999999999999999999999"),
            Err(AmountError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_normalize_shorthand_overflow_is_invalid() {
        assert!(matches!(
            normalize_amount("9999999999999999999999999999jt"),
            Err(AmountError::InvalidAmount(_))
        ));
        assert!(matches!(
            normalize_amount("9999999999999999999999999999rb"),
            Err(AmountError::InvalidAmount(_))
        ));
        assert!(matches!(
            normalize_amount("99999999999999999999999999999999k"),
            Err(AmountError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_extract_all_skips_overflowing_shorthand() {
        let extractor = AmountExtractor::default();
        assert!(extractor.extract_all("TOTAL 9999999999999999999999999999rb").is_empty());

        let found: Vec<u64> = extractor
            .extract_all("9999999999999999999999999999jt 25rb")
            .into_iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(found, vec![25_000]);
    }

    #[test]
    fn test_format_idr() {
        assert_eq!(format_idr(0), "Rp0");
        assert_eq!(format_idr(950), "Rp950");
        assert_eq!(format_idr(89_000), "Rp89.000");
        assert_eq!(format_idr(2_500_000), "Rp2.500.000");
    }

    #[test]
    fn test_extract_all_masks_dates_and_times() {
        let extractor = AmountExtractor::default();
        let found: Vec<u64> = extractor
            .extract_all("12/03/2024 14:05 Total 45.000")
            .into_iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(found, vec![45_000]);
    }

    #[test]
    fn test_extract_all_skips_reference_numbers() {
        let extractor = AmountExtractor::default();
        let found: Vec<u64> = extractor
            .extract_all("Ref 202403120001 Terminal 12345678 Rp 150.000")
            .into_iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(found, vec![150_000]);
    }

    #[test]
    fn test_extract_all_respects_bounds() {
        let extractor = AmountExtractor::default();
        let found: Vec<u64> = extractor
            .extract_all("Qty 2 x 12.000")
            .into_iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(found, vec![12_000]);
    }
}
