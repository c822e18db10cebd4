//! Per-conversation confirmation of extracted results.
//!
//! Every extraction is held as a [`PendingConfirmation`] until the user
//! replies `simpan` or `batal`. `ubah <field> <value>` edits the pending
//! record in place. A conversation has at most one pending record; a new
//! photo replaces the previous one.

mod command;

pub use command::{parse_reply, CorrectionField, ReplyCommand};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CorrectionError, StorageError};
use crate::ledger::Ledger;
use crate::models::receipt::{ExtractedField, ExtractionResult, TransactionId};
use crate::receipt::rules::{format_idr, normalize_amount, parse_date};
use crate::receipt::ResultBuilder;

/// Lifecycle of a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationStatus {
    AwaitingConfirmation,
    Confirmed,
    Cancelled,
}

/// An extraction waiting for the user's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub result: ExtractionResult,
    pub status: ConfirmationStatus,
}

impl PendingConfirmation {
    pub fn new(result: ExtractionResult) -> Self {
        Self {
            result,
            status: ConfirmationStatus::AwaitingConfirmation,
        }
    }
}

/// What to tell the user after a reply was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyOutcome {
    pub reply_text: String,
    /// The pending record is gone (saved or cancelled).
    pub terminal: bool,
    pub status: ConfirmationStatus,
    /// Set when the record was written to the ledger.
    pub transaction_id: Option<TransactionId>,
}

impl ReplyOutcome {
    fn awaiting(reply_text: String) -> Self {
        Self {
            reply_text,
            terminal: false,
            status: ConfirmationStatus::AwaitingConfirmation,
            transaction_id: None,
        }
    }
}

/// Pending confirmations keyed by conversation id.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationBook {
    pending: HashMap<String, PendingConfirmation>,
    builder: ResultBuilder,
}

impl ConfirmationBook {
    /// `builder` must use the same threshold as the extractor that produced
    /// the results, so re-rendered replies match the first ones.
    pub fn new(builder: ResultBuilder) -> Self {
        Self {
            pending: HashMap::new(),
            builder,
        }
    }

    /// Hold `result` for confirmation. Returns the record it replaced, if any.
    pub fn begin(&mut self, conversation: &str, result: ExtractionResult) -> Option<PendingConfirmation> {
        let replaced = self
            .pending
            .insert(conversation.to_string(), PendingConfirmation::new(result));

        if let Some(old) = &replaced {
            warn!(
                "Conversation {}: pending {:?} replaced by a new photo",
                conversation, old.result.amount.value
            );
        } else {
            info!("Conversation {}: awaiting confirmation", conversation);
        }
        replaced
    }

    pub fn get(&self, conversation: &str) -> Option<&PendingConfirmation> {
        self.pending.get(conversation)
    }

    pub fn is_pending(&self, conversation: &str) -> bool {
        self.pending.contains_key(conversation)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Apply one user reply to the conversation's pending record.
    ///
    /// Returns `Ok(None)` when nothing is pending for `conversation`. A
    /// ledger failure is returned as is and leaves the record pending.
    pub fn handle_confirmation_reply<L: Ledger + ?Sized>(
        &mut self,
        conversation: &str,
        reply: &str,
        ledger: &mut L,
    ) -> Result<Option<ReplyOutcome>, StorageError> {
        if !self.pending.contains_key(conversation) {
            return Ok(None);
        }

        let outcome = match parse_reply(reply) {
            Ok(ReplyCommand::Save) => self.save(conversation, ledger)?,
            Ok(ReplyCommand::Cancel) => self.cancel(conversation),
            Ok(ReplyCommand::Correct { field, value }) => self.correct(conversation, field, &value),
            Ok(ReplyCommand::Unrecognized) => ReplyOutcome::awaiting(REPROMPT.to_string()),
            Err(e) => ReplyOutcome::awaiting(correction_hint(&e)),
        };
        Ok(Some(outcome))
    }

    fn save<L: Ledger + ?Sized>(
        &mut self,
        conversation: &str,
        ledger: &mut L,
    ) -> Result<ReplyOutcome, StorageError> {
        let Some(pending) = self.pending.get(conversation) else {
            return Ok(ReplyOutcome::awaiting(REPROMPT.to_string()));
        };

        let amount = match pending.result.require_amount() {
            Ok(amount) => amount,
            Err(_) => return Ok(ReplyOutcome::awaiting(ASK_TOTAL.to_string())),
        };

        let id = ledger.persist(&pending.result).map_err(|e| {
            warn!("Conversation {}: ledger write failed: {}", conversation, e);
            e
        })?;

        let mut done = match self.pending.remove(conversation) {
            Some(done) => done,
            None => return Ok(ReplyOutcome::awaiting(REPROMPT.to_string())),
        };
        done.status = ConfirmationStatus::Confirmed;
        info!("Conversation {}: confirmed as {}", conversation, id);

        let category = done.result.category.as_ref().map(String::as_str).unwrap_or("Lainnya");
        Ok(ReplyOutcome {
            reply_text: format!(
                "Siap! {} senilai {} sudah masuk catatan {}. ✅\nID transaksi: {}",
                done.result.description(),
                format_idr(amount),
                category,
                id
            ),
            terminal: true,
            status: done.status,
            transaction_id: Some(id),
        })
    }

    fn cancel(&mut self, conversation: &str) -> ReplyOutcome {
        self.pending.remove(conversation);
        info!("Conversation {}: cancelled", conversation);

        ReplyOutcome {
            reply_text: "Oke, struknya tidak jadi disimpan.".to_string(),
            terminal: true,
            status: ConfirmationStatus::Cancelled,
            transaction_id: None,
        }
    }

    fn correct(&mut self, conversation: &str, field: CorrectionField, value: &str) -> ReplyOutcome {
        let Some(pending) = self.pending.get_mut(conversation) else {
            return ReplyOutcome::awaiting(REPROMPT.to_string());
        };

        let shown = match apply_correction(&mut pending.result, field, value) {
            Ok(shown) => shown,
            Err(e) => return ReplyOutcome::awaiting(correction_hint(&e)),
        };
        self.builder.refresh(&mut pending.result);
        info!("Conversation {}: {} corrected", conversation, field);

        ReplyOutcome::awaiting(format!(
            "Siap, {} diubah jadi {}.\n\n{}",
            field, shown, pending.result.reply_text
        ))
    }
}

const REPROMPT: &str = "Balas `simpan` untuk menyimpan, `batal` untuk membatalkan, \
                        atau `ubah total <nominal>` untuk mengoreksi.";

const ASK_TOTAL: &str = "Totalnya belum kebaca nih, Kak. Balas `ubah total <nominal>` dulu ya, \
                         contoh: `ubah total 125000`.";

/// Overwrite one field; returns the value as shown back to the user.
fn apply_correction(
    result: &mut ExtractionResult,
    field: CorrectionField,
    value: &str,
) -> Result<String, CorrectionError> {
    let invalid = || CorrectionError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    };

    match field {
        CorrectionField::Total => {
            let amount = normalize_amount(value).map_err(|_| invalid())?;
            if amount == 0 {
                return Err(invalid());
            }
            result.amount = ExtractedField::corrected(amount);
            Ok(format_idr(amount))
        }
        CorrectionField::Date => {
            let date = parse_date(value).ok_or_else(invalid)?;
            result.date = ExtractedField::corrected(date);
            Ok(date.format("%d/%m/%Y").to_string())
        }
        CorrectionField::Category => {
            result.category = ExtractedField::corrected(value.to_string());
            Ok(value.to_string())
        }
        CorrectionField::Merchant => {
            result.merchant = ExtractedField::corrected(value.to_string());
            Ok(value.to_string())
        }
    }
}

fn correction_hint(error: &CorrectionError) -> String {
    let fields = CorrectionField::ALL
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    match error {
        CorrectionError::UnrecognizedField(name) if name.is_empty() => {
            format!("Mau ubah apa, Kak? Pilihan: {}.", fields)
        }
        CorrectionError::UnrecognizedField(name) => {
            format!("Field `{}` tidak bisa diubah. Pilihan: {}.", name, fields)
        }
        CorrectionError::InvalidValue { field, value } => {
            format!("`{}` bukan {} yang valid. {}", value, field, usage_for(field))
        }
        CorrectionError::EmptyValue(field) => usage_for(field).to_string(),
    }
}

fn usage_for(field: &str) -> &'static str {
    CorrectionField::ALL
        .iter()
        .find(|f| f.to_string() == field)
        .map(|f| f.usage())
        .unwrap_or("Format: `ubah <field> <nilai>`")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::models::receipt::Provenance;
    use crate::receipt::extract;

    struct BrokenLedger;

    impl Ledger for BrokenLedger {
        fn persist(&mut self, _: &ExtractionResult) -> Result<TransactionId, StorageError> {
            Err(StorageError::Rejected("disk full".to_string()))
        }
    }

    fn book_with(conversation: &str, lines: &[&str]) -> ConfirmationBook {
        let mut book = ConfirmationBook::default();
        book.begin(conversation, extract(lines));
        book
    }

    #[test]
    fn test_no_pending_is_not_handled() {
        let mut book = ConfirmationBook::default();
        let mut ledger = MemoryLedger::new();
        assert_eq!(book.handle_confirmation_reply("c1", "simpan", &mut ledger).unwrap(), None);
    }

    #[test]
    fn test_save_writes_once() {
        let mut book = book_with("c1", &["INDOMARET", "TOTAL 12.000"]);
        let mut ledger = MemoryLedger::new();

        let outcome = book
            .handle_confirmation_reply("c1", "Simpan", &mut ledger)
            .unwrap()
            .unwrap();

        assert!(outcome.terminal);
        assert_eq!(outcome.status, ConfirmationStatus::Confirmed);
        assert_eq!(outcome.transaction_id, Some(TransactionId(1)));
        assert!(outcome.reply_text.contains("Belanja INDOMARET senilai Rp12.000"));
        assert!(outcome.reply_text.contains("ID transaksi: #1"));
        assert_eq!(ledger.len(), 1);
        assert!(!book.is_pending("c1"));

        // Nothing left to confirm
        assert_eq!(book.handle_confirmation_reply("c1", "simpan", &mut ledger).unwrap(), None);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_cancel_skips_ledger() {
        let mut book = book_with("c1", &["INDOMARET", "TOTAL 12.000"]);
        let mut ledger = MemoryLedger::new();

        let outcome = book.handle_confirmation_reply("c1", "batal", &mut ledger).unwrap().unwrap();

        assert_eq!(outcome.status, ConfirmationStatus::Cancelled);
        assert!(outcome.terminal);
        assert!(ledger.is_empty());
        assert!(book.is_empty());
    }

    #[test]
    fn test_save_without_amount_is_refused() {
        let mut book = book_with("c1", &["TOKO", "TERIMA KASIH"]);
        let mut ledger = MemoryLedger::new();

        let outcome = book.handle_confirmation_reply("c1", "simpan", &mut ledger).unwrap().unwrap();

        assert!(!outcome.terminal);
        assert_eq!(outcome.reply_text, ASK_TOTAL);
        assert!(ledger.is_empty());
        assert!(book.is_pending("c1"));
    }

    #[test]
    fn test_correct_total_then_save() {
        let mut book = book_with("c1", &["TOKO", "TERIMA KASIH"]);
        let mut ledger = MemoryLedger::new();

        let outcome = book
            .handle_confirmation_reply("c1", "ubah total 95000", &mut ledger)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.status, ConfirmationStatus::AwaitingConfirmation);
        assert!(outcome.reply_text.starts_with("Siap, total diubah jadi Rp95.000."));

        let pending = book.get("c1").unwrap();
        assert_eq!(pending.result.amount.provenance, Provenance::UserCorrected);
        assert!(!pending.result.requires_confirmation);

        book.handle_confirmation_reply("c1", "simpan", &mut ledger).unwrap();
        assert_eq!(ledger.records()[0].1.amount.value, Some(95_000));
    }

    #[test]
    fn test_correction_keeps_confidence() {
        let mut book = book_with("c1", &["12.000", "45.000"]);
        let before = book.get("c1").unwrap().result.confidence;

        book.handle_confirmation_reply("c1", "ubah kategori Makanan", &mut MemoryLedger::new())
            .unwrap();

        let result = &book.get("c1").unwrap().result;
        assert_eq!(result.confidence, before);
        assert_eq!(result.category, ExtractedField::corrected("Makanan".to_string()));
    }

    #[test]
    fn test_correct_date() {
        let mut book = book_with("c1", &["TOKO", "TOTAL 10.000"]);
        let outcome = book
            .handle_confirmation_reply("c1", "ubah tanggal 5 Januari 2025", &mut MemoryLedger::new())
            .unwrap()
            .unwrap();

        assert!(outcome.reply_text.starts_with("Siap, tanggal diubah jadi 05/01/2025."));
    }

    #[test]
    fn test_invalid_corrections_leave_state() {
        let mut book = book_with("c1", &["TOKO", "TOTAL 10.000"]);
        let before = book.get("c1").cloned();
        let mut ledger = MemoryLedger::new();

        for (reply, expected) in [
            ("ubah total abc", "`abc` bukan total yang valid."),
            ("ubah tanggal kemarin", "`kemarin` bukan tanggal yang valid."),
            ("ubah warna merah", "Field `warna` tidak bisa diubah."),
            ("ubah total", "Format ubah total"),
        ] {
            let outcome = book.handle_confirmation_reply("c1", reply, &mut ledger).unwrap().unwrap();
            assert!(!outcome.terminal);
            assert!(outcome.reply_text.starts_with(expected), "{}", outcome.reply_text);
        }

        assert_eq!(book.get("c1").cloned(), before);
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        let mut book = book_with("c1", &["TOKO", "TOTAL 10.000"]);
        let before = book.get("c1").cloned();
        let mut ledger = MemoryLedger::new();

        let outcome = book
            .handle_confirmation_reply("c1", "ubah total 9999999999999999999999999999jt", &mut ledger)
            .unwrap()
            .unwrap();

        assert!(!outcome.terminal);
        assert!(
            outcome
                .reply_text
                .starts_with("`9999999999999999999999999999jt` bukan total yang valid."),
            "{}",
            outcome.reply_text
        );
        assert_eq!(book.get("c1").cloned(), before);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_unrecognized_reply_reprompts() {
        let mut book = book_with("c1", &["TOKO", "TOTAL 10.000"]);
        let outcome = book
            .handle_confirmation_reply("c1", "makasih", &mut MemoryLedger::new())
            .unwrap()
            .unwrap();
        assert_eq!(outcome.reply_text, REPROMPT);
        assert!(book.is_pending("c1"));
    }

    #[test]
    fn test_storage_error_keeps_pending() {
        let mut book = book_with("c1", &["TOKO", "TOTAL 10.000"]);

        let err = book.handle_confirmation_reply("c1", "simpan", &mut BrokenLedger);
        assert!(matches!(err, Err(StorageError::Rejected(_))));
        assert!(book.is_pending("c1"));

        // Retry against a working ledger
        let mut ledger = MemoryLedger::new();
        let outcome = book.handle_confirmation_reply("c1", "simpan", &mut ledger).unwrap().unwrap();
        assert_eq!(outcome.status, ConfirmationStatus::Confirmed);
    }

    #[test]
    fn test_new_photo_replaces_pending() {
        let mut book = book_with("c1", &["TOKO A", "TOTAL 10.000"]);
        let replaced = book.begin("c1", extract(&["TOKO B", "TOTAL 20.000"]));

        assert_eq!(replaced.unwrap().result.amount.value, Some(10_000));
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("c1").unwrap().result.amount.value, Some(20_000));
    }

    #[test]
    fn test_conversations_are_independent() {
        let mut book = book_with("c1", &["TOKO A", "TOTAL 10.000"]);
        book.begin("c2", extract(&["TOKO B", "TOTAL 20.000"]));
        let mut ledger = MemoryLedger::new();

        book.handle_confirmation_reply("c1", "batal", &mut ledger).unwrap();

        assert!(!book.is_pending("c1"));
        assert!(book.is_pending("c2"));
    }
}
