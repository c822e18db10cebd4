//! Transaction date extraction.

use chrono::NaiveDate;

use super::patterns::{DATE_NUMERIC, DATE_WORDS};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// All valid dates in the text, ordered by position.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // DD/MM/YY, DD/MM/YYYY, DD-MM-YYYY, DD-MM-YY
        for caps in DATE_NUMERIC.captures_iter(text) {
            if caps[2] != caps[4] {
                continue;
            }
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[3].parse().unwrap_or(0);
            let year = parse_year(&caps[5]);

            if let (Some(date), Some(full_match)) =
                (NaiveDate::from_ymd_opt(year, month, day), caps.get(0))
            {
                results.push(
                    ExtractionMatch::new(date, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        // "12 Feb 2024", "3 Agustus 25"
        for caps in DATE_WORDS.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month = month_to_number(&caps[2]);
            let year = parse_year(&caps[3]);

            if let (Some(date), Some(full_match)) =
                (NaiveDate::from_ymd_opt(year, month, day), caps.get(0))
            {
                results.push(
                    ExtractionMatch::new(date, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results.sort_by_key(|m| m.position);
        results
    }
}

/// First date in line order.
pub fn extract_date<S: AsRef<str>>(lines: &[S]) -> Option<ExtractionMatch<NaiveDate>> {
    let extractor = DateExtractor::new();
    lines.iter().find_map(|line| extractor.extract(line.as_ref()))
}

/// Parse a user-typed date such as `13/02/2026` or `13 Feb 2026`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    DateExtractor::new().extract(text.trim()).map(|m| m.value)
}

/// Two-digit years are always 20YY.
fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        2000 + year
    } else {
        year
    }
}

fn month_to_number(month: &str) -> u32 {
    match month.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "mei" | "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "agu" | "aug" => 8,
        "sep" => 9,
        "okt" | "oct" => 10,
        "nov" => 11,
        "des" | "dec" => 12,
        _ => 0,
    }
}
