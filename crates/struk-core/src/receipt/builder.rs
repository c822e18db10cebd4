//! Assembles extracted fields into an [`ExtractionResult`] and its reply.

use chrono::NaiveDate;

use super::extractor::ExtractedFields;
use super::rules::format_idr;
use crate::models::receipt::{DocumentType, ExtractedField, ExtractionResult, Provenance};

/// Category hint for transfer proofs.
pub const BANK_CATEGORY: &str = "Transfer/Bank";

const UNKNOWN_TYPE_FACTOR: f32 = 0.8;
const FALLBACK_AMOUNT_FACTOR: f32 = 0.9;

/// Builds results against a fixed low-confidence threshold.
#[derive(Debug, Clone, Copy)]
pub struct ResultBuilder {
    threshold: f32,
}

impl ResultBuilder {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn build(
        &self,
        document_type: DocumentType,
        fields: ExtractedFields,
        noise_confidence: f32,
    ) -> ExtractionResult {
        let category = match document_type {
            DocumentType::BankProof => ExtractedField::matched(BANK_CATEGORY.to_string()),
            DocumentType::Receipt | DocumentType::Unknown => ExtractedField::missing(),
        };

        let mut confidence = noise_confidence;
        if document_type == DocumentType::Unknown {
            confidence *= UNKNOWN_TYPE_FACTOR;
        }
        match fields.amount.provenance {
            Provenance::Fallback => confidence *= FALLBACK_AMOUNT_FACTOR,
            // Never let an absent total look acceptable
            Provenance::Missing => confidence = confidence.min(self.threshold / 2.0),
            Provenance::MatchedKeyword | Provenance::UserCorrected => {}
        }
        let confidence = confidence.clamp(0.0, 1.0);

        let mut result = ExtractionResult {
            document_type,
            merchant: fields.merchant,
            date: fields.date,
            amount: fields.amount,
            category,
            confidence,
            requires_confirmation: false,
            reply_text: String::new(),
        };
        self.refresh(&mut result);
        result
    }

    /// Recompute `requires_confirmation` and `reply_text` from the fields.
    ///
    /// Confidence is left as is.
    pub fn refresh(&self, result: &mut ExtractionResult) {
        result.requires_confirmation = self.needs_caveat(result);
        result.reply_text = self.render_reply(result);
    }

    /// The low-confidence caveat is dropped once the user typed the total.
    pub fn needs_caveat(&self, result: &ExtractionResult) -> bool {
        match result.amount.provenance {
            Provenance::Missing => true,
            Provenance::UserCorrected => false,
            Provenance::MatchedKeyword | Provenance::Fallback => result.confidence < self.threshold,
        }
    }

    pub fn render_reply(&self, result: &ExtractionResult) -> String {
        if self.needs_caveat(result) {
            render_manual_prompt(result)
        } else {
            render_summary(result)
        }
    }
}

impl Default for ResultBuilder {
    fn default() -> Self {
        Self::new(0.5)
    }
}

fn render_summary(result: &ExtractionResult) -> String {
    format!(
        "Wah, {} dari {} ya! Berhasil dicatat nih:\n\n{}\n\
         Mau langsung simpan atau ada yang mau diubah?",
        result.document_type.source_label(),
        display_text(&result.merchant, "Merchant tidak diketahui"),
        field_lines(result),
    )
}

fn render_manual_prompt(result: &ExtractionResult) -> String {
    format!(
        "Sepertinya struknya agak buram, boleh konfirmasi total belanjanya berapa, Kak?\n\n\
         Yang terbaca:\nMerchant: {}\n{}\n\
         Balas `ubah total <nominal>` lalu `simpan`, atau `batal`.",
        display_text(&result.merchant, "-"),
        field_lines(result),
    )
}

/// Total, category and date in fixed order.
fn field_lines(result: &ExtractionResult) -> String {
    let total = result
        .amount
        .value
        .map(format_idr)
        .unwrap_or_else(|| "-".to_string());

    format!(
        "Total: {}\n\nKategori: {}\n\nTanggal: {}\n",
        total,
        display_text(&result.category, "-"),
        display_date(&result.date),
    )
}

fn display_text<'a>(field: &'a ExtractedField<String>, missing: &'a str) -> &'a str {
    field.value.as_deref().unwrap_or(missing)
}

fn display_date(field: &ExtractedField<NaiveDate>) -> String {
    field
        .value
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}
