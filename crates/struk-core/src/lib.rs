//! Core library for Indonesian receipt and transfer-proof extraction.
//!
//! This crate provides:
//! - Amount, date and merchant extraction from OCR line blocks
//! - Receipt vs. bank transfer classification and OCR noise scoring
//! - A per-conversation confirmation flow (`simpan` / `batal` / `ubah`)
//! - Collaborator traits for text recognition and ledger storage

pub mod confirmation;
pub mod error;
pub mod ledger;
pub mod models;
pub mod ocr;
pub mod receipt;
pub mod session;

pub use confirmation::{ConfirmationBook, ConfirmationStatus, PendingConfirmation, ReplyOutcome};
pub use error::{
    AmountError, CorrectionError, ExtractionError, OcrError, Result, StorageError, StrukError,
};
pub use ledger::{Ledger, MemoryLedger};
pub use models::config::StrukConfig;
pub use models::receipt::{DocumentType, ExtractedField, ExtractionResult, Provenance, TransactionId};
pub use ocr::{TextRecognizer, TranscriptRecognizer};
pub use receipt::rules::{format_idr, normalize_amount};
pub use receipt::{extract, LineBlock, ReceiptExtractor};
pub use session::ReceiptSession;
