//! Error types for the struk-core library.

use thiserror::Error;

/// Main error type for the struk library.
#[derive(Error, Debug)]
pub enum StrukError {
    /// OCR collaborator error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Ledger collaborator error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Amount normalization error.
    #[error("amount error: {0}")]
    Amount(#[from] AmountError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Rejected user correction.
    #[error("correction error: {0}")]
    Correction(#[from] CorrectionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while normalizing a single amount token.
///
/// These never leave the extractor: a rejected token simply stops being a
/// candidate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The token contains no digit at all.
    #[error("no digits in {0:?}")]
    NoDigits(String),

    /// The token has digits but cannot be read as a whole amount.
    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),
}

/// Errors related to field extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Neither a keyword nor the numeric fallback produced a total.
    #[error("no amount found")]
    NoAmountFound,
}

/// Errors for `ubah <field> <value>` corrections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrectionError {
    /// The named field cannot be corrected.
    #[error("unrecognized correction field: {0}")]
    UnrecognizedField(String),

    /// The value does not parse for the field.
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// `ubah <field>` without a value.
    #[error("missing value for {0}")]
    EmptyValue(String),
}

/// Errors from the OCR collaborator.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The recognition service could not be reached or refused the image.
    #[error("OCR unavailable: {0}")]
    Unavailable(String),

    /// The service answered but produced no text.
    #[error("no text recognized")]
    EmptyTranscript,
}

/// Errors from the ledger collaborator.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying I/O failure.
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded.
    #[error("failed to serialize record: {0}")]
    Serialization(String),

    /// The ledger refused the record.
    #[error("record rejected: {0}")]
    Rejected(String),
}

/// Result type for the struk library.
pub type Result<T> = std::result::Result<T, StrukError>;
