//! Transaction record produced from one scanned receipt or transfer proof.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Kind of document a line block was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Retail receipt (struk belanja).
    Receipt,
    /// Bank transfer or QRIS payment proof.
    BankProof,
    /// No signal either way; handled like a receipt.
    Unknown,
}

impl DocumentType {
    /// Label used in reply text.
    pub fn source_label(&self) -> &'static str {
        match self {
            Self::BankProof => "bukti transaksi bank",
            Self::Receipt | Self::Unknown => "struk",
        }
    }
}

/// How a field value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Found next to a priority keyword or by a dedicated pattern.
    MatchedKeyword,
    /// Derived from the numeric fallback (largest amount).
    Fallback,
    /// Nothing usable was found.
    Missing,
    /// Supplied by the user through `ubah`.
    UserCorrected,
}

/// A field value paired with its provenance.
///
/// `value` is `None` exactly when `provenance` is [`Provenance::Missing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedField<T> {
    pub value: Option<T>,
    pub provenance: Provenance,
}

impl<T> ExtractedField<T> {
    pub fn matched(value: T) -> Self {
        Self {
            value: Some(value),
            provenance: Provenance::MatchedKeyword,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value: Some(value),
            provenance: Provenance::Fallback,
        }
    }

    pub fn corrected(value: T) -> Self {
        Self {
            value: Some(value),
            provenance: Provenance::UserCorrected,
        }
    }

    pub fn missing() -> Self {
        Self {
            value: None,
            provenance: Provenance::Missing,
        }
    }

    /// Wrap an optional value, `Missing` when absent.
    pub fn from_option(value: Option<T>, provenance: Provenance) -> Self {
        match value {
            Some(value) => Self {
                value: Some(value),
                provenance,
            },
            None => Self::missing(),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.provenance == Provenance::Missing
    }

    pub fn as_ref(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

impl<T> Default for ExtractedField<T> {
    fn default() -> Self {
        Self::missing()
    }
}

/// Structured result of one extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Classified document kind.
    pub document_type: DocumentType,

    /// Merchant name (receipts only).
    pub merchant: ExtractedField<String>,

    /// Transaction date.
    pub date: ExtractedField<NaiveDate>,

    /// Total or transfer nominal in whole Rupiah.
    pub amount: ExtractedField<u64>,

    /// Category hint; downstream categorization fills receipts in.
    pub category: ExtractedField<String>,

    /// Noise-derived confidence (0.0 - 1.0).
    pub confidence: f32,

    /// Whether the user must confirm or correct before saving.
    pub requires_confirmation: bool,

    /// Message to send back to the user.
    pub reply_text: String,
}

impl ExtractionResult {
    /// The extracted total, or `NoAmountFound`.
    pub fn require_amount(&self) -> Result<u64, ExtractionError> {
        self.amount.value.ok_or(ExtractionError::NoAmountFound)
    }

    /// Ledger description, e.g. "Belanja Indomaret".
    pub fn description(&self) -> String {
        let merchant = self.merchant.as_ref().map(String::as_str);
        match (self.document_type, merchant) {
            (DocumentType::BankProof, Some(name)) => format!("Transfer ke {}", name),
            (DocumentType::BankProof, None) => "Transaksi Bank".to_string(),
            (_, Some(name)) => format!("Belanja {}", name),
            (_, None) => "Belanja".to_string(),
        }
    }
}

/// Identifier assigned by the ledger to a stored transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
