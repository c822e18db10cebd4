//! Keyword-priority rule sets for the total / nominal amount.
//!
//! A rule set is plain data: keywords in search priority and exclusion
//! patterns. Receipts and transfer proofs each get one, so either list can be
//! swapped or tested on its own.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::amounts::AmountExtractor;
use super::patterns::{keyword_pattern, AMOUNT_TOKEN};
use super::FieldExtractor;
use crate::models::receipt::ExtractedField;

/// Reference and account labels. A keyword segment ends where one begins.
const REFERENCE_LABELS: &[&str] = &[
    "SOURCE OF FUND",
    "REFERENCE",
    "REF NO",
    "REF",
    "MERCHANT PAN",
    "CUSTOMER PAN",
    "PAN",
    "TERMINAL ID",
    "ACQUIRER",
    "AVAILABLE",
];

/// Lines about charges or payment state, never a value for a bare label.
const CHARGE_HINTS: &[&str] = &["PPN", "TAX", "PAJAK", "SERVICE", "PAYMENT", "PAID"];

const RECEIPT_KEYWORDS: &[&str] = &["TOTAL BAYAR", "GRAND TOTAL", "TOTAL", "NETTO", "AMOUNT DUE", "JUMLAH"];

const BANK_KEYWORDS: &[&str] = &["NOMINAL", "JUMLAH TRANSFER", "AMOUNT", "DEBIT"];

lazy_static! {
    pub static ref RECEIPT_RULES: KeywordRuleSet = KeywordRuleSet::new(
        "receipt",
        RECEIPT_KEYWORDS,
        &["SUBTOTAL", "SUB TOTAL", "KEMBALIAN", "CHANGE", "TUNAI", "CASH", "DISKON", "DISCOUNT"],
    )
    .with_cut_labels(REFERENCE_LABELS)
    .with_value_hints(CHARGE_HINTS);

    /// Transfer keywords first, then the receipt keywords as a lower tier.
    pub static ref BANK_RULES: KeywordRuleSet = KeywordRuleSet::new(
        "bank",
        &[BANK_KEYWORDS, RECEIPT_KEYWORDS].concat(),
        &["SALDO", "BALANCE", "ADMIN", "BIAYA", "FEE", "PAJAK", "KEMBALIAN", "SUBTOTAL", "SUB TOTAL"],
    )
    .with_cut_labels(REFERENCE_LABELS)
    .with_value_hints(CHARGE_HINTS);
}

/// One keyword with its search priority (0 is searched first).
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub priority: usize,
    pub keyword: String,
    pattern: Regex,
}

impl KeywordRule {
    pub fn new(priority: usize, keyword: &str) -> Self {
        Self {
            priority,
            keyword: keyword.to_string(),
            pattern: keyword_pattern(keyword),
        }
    }

    /// Byte offset just past the keyword, if the line contains it.
    pub fn match_end(&self, line: &str) -> Option<usize> {
        self.pattern.find(line).map(|m| m.end())
    }
}

/// Keyword rules searched by priority, plus lines that must never
/// contribute an amount.
#[derive(Debug, Clone)]
pub struct KeywordRuleSet {
    pub name: String,
    rules: Vec<KeywordRule>,
    exclusions: Vec<Regex>,
    cut_labels: Vec<Regex>,
    value_hints: Vec<Regex>,
}

impl KeywordRuleSet {
    /// Keywords are given in priority order.
    pub fn new(name: &str, keywords: &[&str], exclusions: &[&str]) -> Self {
        let rules = keywords
            .iter()
            .enumerate()
            .map(|(priority, keyword)| KeywordRule::new(priority, keyword))
            .collect();
        Self::from_rules(name, rules, exclusions)
    }

    pub fn from_rules(name: &str, mut rules: Vec<KeywordRule>, exclusions: &[&str]) -> Self {
        rules.sort_by_key(|r| r.priority);
        Self {
            name: name.to_string(),
            rules,
            exclusions: compile(exclusions),
            cut_labels: Vec::new(),
            value_hints: Vec::new(),
        }
    }

    /// Labels that end the text searched after a keyword. Lines carrying
    /// one never lend a value to the next-line or fallback passes.
    pub fn with_cut_labels(mut self, labels: &[&str]) -> Self {
        self.cut_labels.extend(compile(labels));
        self
    }

    /// Lines carrying a hint never lend a value to the next-line or
    /// fallback passes.
    pub fn with_value_hints(mut self, hints: &[&str]) -> Self {
        self.value_hints.extend(compile(hints));
        self
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn is_excluded(&self, line: &str) -> bool {
        self.exclusions.iter().any(|p| p.is_match(line))
    }

    pub fn matches_keyword(&self, line: &str) -> bool {
        self.rules.iter().any(|r| r.match_end(line).is_some())
    }

    /// Whether a line without a keyword may supply an amount.
    fn is_value_line(&self, line: &str) -> bool {
        !self.is_excluded(line)
            && !self.cut_labels.iter().any(|p| p.is_match(line))
            && !self.value_hints.iter().any(|p| p.is_match(line))
    }

    /// Text after the keyword, up to the first cut label.
    fn keyword_segment<'a>(&self, line: &'a str, end: usize) -> &'a str {
        let segment = &line[end..];
        let cut = self
            .cut_labels
            .iter()
            .filter_map(|p| p.find(segment))
            .map(|m| m.start())
            .min();
        match cut {
            Some(at) => &segment[..at],
            None => segment,
        }
    }

    /// Keyword search in priority order, then the largest-amount fallback.
    ///
    /// Excluded lines are skipped by both passes.
    pub fn find_amount<S: AsRef<str>>(
        &self,
        lines: &[S],
        extractor: &AmountExtractor,
    ) -> ExtractedField<u64> {
        if let Some(amount) = self.keyword_amount(lines, extractor) {
            return ExtractedField::matched(amount);
        }

        let fallback = lines
            .iter()
            .map(AsRef::as_ref)
            .filter(|line| self.is_value_line(line))
            .flat_map(|line| extractor.extract_all(line))
            .map(|m| m.value)
            .max();

        if let Some(amount) = fallback {
            debug!("No {} keyword matched, fallback amount {}", self.name, amount);
            return ExtractedField::fallback(amount);
        }

        ExtractedField::missing()
    }

    fn keyword_amount<S: AsRef<str>>(&self, lines: &[S], extractor: &AmountExtractor) -> Option<u64> {
        for rule in &self.rules {
            for (idx, line) in lines.iter().map(AsRef::as_ref).enumerate() {
                if self.is_excluded(line) {
                    continue;
                }
                let Some(end) = rule.match_end(line) else {
                    continue;
                };

                if let Some(found) = extractor.extract(self.keyword_segment(line, end)) {
                    debug!(
                        "Keyword {:?} matched {:?} on line {}: {}",
                        rule.keyword, found.source, idx, found.value
                    );
                    return Some(found.value);
                }

                // Label and value split over two OCR lines
                if let Some(next) = lines.get(idx + 1).map(AsRef::as_ref) {
                    if self.is_value_line(next) && !self.matches_keyword(next) && is_amount_only(next) {
                        if let Some(found) = extractor.extract(next) {
                            debug!(
                                "Keyword {:?} took {:?} from line {}",
                                rule.keyword,
                                found.source,
                                idx + 1
                            );
                            return Some(found.value);
                        }
                    }
                }
            }
        }
        None
    }
}

fn compile(phrases: &[&str]) -> Vec<Regex> {
    phrases.iter().map(|p| keyword_pattern(p)).collect()
}

/// A line that is just an amount, maybe with a currency marker.
fn is_amount_only(line: &str) -> bool {
    let rest = AMOUNT_TOKEN.replace_all(line, "");
    rest.chars().filter(|c| c.is_alphabetic()).count() < 3
}
