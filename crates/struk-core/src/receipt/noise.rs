//! OCR noise estimation.

use tracing::debug;

use super::rules::{AmountExtractor, FieldExtractor};
use super::LineBlock;

const GARBLED_WEIGHT: f32 = 0.35;
const SHORT_WEIGHT: f32 = 0.15;
const NO_AMOUNT_PENALTY: f32 = 0.6;

/// Scores how legible a line block is.
#[derive(Debug, Clone)]
pub struct NoiseEstimator {
    min_legible_len: usize,
    garble_density: f32,
}

/// Components of a noise score, kept for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseReport {
    pub garbled_fraction: f32,
    pub short_fraction: f32,
    pub has_amount: bool,
    pub confidence: f32,
}

impl NoiseEstimator {
    pub fn new(min_legible_len: usize, garble_density: f32) -> Self {
        Self {
            min_legible_len,
            garble_density,
        }
    }

    /// Confidence in `[0, 1]`; lower means noisier.
    pub fn confidence(&self, block: &LineBlock, amounts: &AmountExtractor) -> f32 {
        self.report(block, amounts).confidence
    }

    pub fn report(&self, block: &LineBlock, amounts: &AmountExtractor) -> NoiseReport {
        if block.is_empty() {
            return NoiseReport {
                garbled_fraction: 1.0,
                short_fraction: 1.0,
                has_amount: false,
                confidence: 0.0,
            };
        }

        let total = block.len() as f32;
        let garbled = block.iter().filter(|l| self.is_garbled(l)).count() as f32;
        let short = block
            .iter()
            .filter(|l| l.chars().count() < self.min_legible_len)
            .count() as f32;
        let has_amount = block.iter().any(|l| amounts.extract(l).is_some());

        let garbled_fraction = garbled / total;
        let short_fraction = short / total;
        let mut score = 1.0 - GARBLED_WEIGHT * garbled_fraction - SHORT_WEIGHT * short_fraction;
        if !has_amount {
            score -= NO_AMOUNT_PENALTY;
        }

        let report = NoiseReport {
            garbled_fraction,
            short_fraction,
            has_amount,
            confidence: score.clamp(0.0, 1.0),
        };
        debug!(?report, "Noise estimate over {} lines", block.len());
        report
    }

    /// Too many characters sit in runs of two or more symbols.
    fn is_garbled(&self, line: &str) -> bool {
        let chars: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.is_empty() || is_separator_rule(&chars) {
            return false;
        }

        let mut in_runs = 0usize;
        let mut run = 0usize;
        for c in chars.iter().chain(std::iter::once(&'a')) {
            if c.is_alphanumeric() {
                if run >= 2 {
                    in_runs += run;
                }
                run = 0;
            } else {
                run += 1;
            }
        }

        in_runs as f32 / chars.len() as f32 > self.garble_density
    }
}

impl Default for NoiseEstimator {
    fn default() -> Self {
        Self::new(3, 0.3)
    }
}

/// "-------" or "=====" printed between receipt sections.
fn is_separator_rule(chars: &[char]) -> bool {
    chars.len() >= 3 && !chars[0].is_alphanumeric() && chars.iter().all(|c| *c == chars[0])
}
