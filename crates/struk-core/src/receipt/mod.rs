//! Receipt and transfer-proof extraction.

mod builder;
mod classifier;
mod extractor;
mod noise;
pub mod rules;

pub use builder::{ResultBuilder, BANK_CATEGORY};
pub use classifier::classify;
pub use extractor::{extract_fields, extract_merchant, ExtractedFields};
pub use noise::{NoiseEstimator, NoiseReport};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::config::ExtractionConfig;
use crate::models::receipt::ExtractionResult;
use rules::{AmountBounds, AmountExtractor};

/// OCR lines of one document, top to bottom.
///
/// Whitespace runs are collapsed and blank lines dropped on construction;
/// the block is immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBlock {
    lines: Vec<String>,
}

impl LineBlock {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .map(|l| l.as_ref().split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|l| !l.is_empty())
            .collect();
        Self { lines }
    }

    /// Split a newline-separated transcript.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Configured extraction pipeline.
#[derive(Debug, Clone)]
pub struct ReceiptExtractor {
    amounts: AmountExtractor,
    noise: NoiseEstimator,
    builder: ResultBuilder,
    merchant_lines: usize,
}

impl ReceiptExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            amounts: AmountExtractor::new(AmountBounds {
                min: config.min_amount,
                max: config.max_amount,
            }),
            noise: NoiseEstimator::new(config.min_legible_len, config.garble_density),
            builder: ResultBuilder::new(config.low_confidence_threshold),
            merchant_lines: config.merchant_lines,
        }
    }

    pub fn builder(&self) -> &ResultBuilder {
        &self.builder
    }

    /// Extract a transaction record from one line block. Pure.
    pub fn extract_block(&self, block: &LineBlock) -> ExtractionResult {
        let confidence = self.noise.confidence(block, &self.amounts);
        let document_type = classify(block);
        let fields = extract_fields(block, document_type, &self.amounts, self.merchant_lines);
        let result = self.builder.build(document_type, fields, confidence);

        info!(
            "Extracted {:?}: amount {:?} ({:?}), confidence {:.2}",
            result.document_type, result.amount.value, result.amount.provenance, result.confidence
        );
        result
    }

    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> ExtractionResult {
        self.extract_block(&LineBlock::new(lines))
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

/// Extract with the default configuration.
pub fn extract<S: AsRef<str>>(lines: &[S]) -> ExtractionResult {
    ReceiptExtractor::default().extract(lines)
}
