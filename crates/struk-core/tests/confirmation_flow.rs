use std::cell::Cell;

use struk_core::{
    ConfirmationStatus, ExtractionResult, Ledger, Provenance, ReceiptSession, StorageError,
    StrukConfig, TransactionId, TranscriptRecognizer,
};

/// Records every write so tests can count ledger calls.
#[derive(Default)]
struct CountingLedger {
    writes: Vec<u64>,
    fail_next: Cell<bool>,
}

impl Ledger for CountingLedger {
    fn persist(&mut self, result: &ExtractionResult) -> Result<TransactionId, StorageError> {
        if self.fail_next.replace(false) {
            return Err(StorageError::Rejected("ledger offline".to_string()));
        }
        self.writes.push(result.amount.value.unwrap_or_default());
        Ok(TransactionId(self.writes.len() as u64))
    }
}

fn session() -> ReceiptSession<TranscriptRecognizer, CountingLedger> {
    ReceiptSession::new(&StrukConfig::default(), TranscriptRecognizer, CountingLedger::default())
}

const BLURRY: &[u8] = b"T0K#@! M~~J\nTERIMA KASIH\n";

#[test]
fn cancel_never_touches_the_ledger() {
    let mut s = session();
    s.handle_photo("wa:1", b"ALFAMART\nTOTAL 15.000\n").unwrap();

    let outcome = s.handle_reply("wa:1", "batal").unwrap().unwrap();

    assert_eq!(outcome.status, ConfirmationStatus::Cancelled);
    assert!(outcome.terminal);
    assert!(s.ledger().writes.is_empty());
}

#[test]
fn correct_then_save_writes_exactly_once() {
    let mut s = session();
    let result = s.handle_photo("wa:1", BLURRY).unwrap();
    assert!(result.requires_confirmation);
    assert!(result.amount.is_missing());

    let outcome = s.handle_reply("wa:1", "ubah total 95000").unwrap().unwrap();
    assert_eq!(outcome.status, ConfirmationStatus::AwaitingConfirmation);
    assert!(!outcome.terminal);

    let pending = s.book().get("wa:1").unwrap();
    assert_eq!(pending.result.amount.provenance, Provenance::UserCorrected);
    assert_eq!(pending.result.amount.value, Some(95_000));

    let outcome = s.handle_reply("wa:1", "simpan").unwrap().unwrap();
    assert_eq!(outcome.status, ConfirmationStatus::Confirmed);
    assert_eq!(outcome.transaction_id, Some(TransactionId(1)));
    assert!(outcome.reply_text.contains("Rp95.000"));
    assert!(outcome.reply_text.contains("ID transaksi: #1"));

    assert_eq!(s.ledger().writes, vec![95_000]);
    assert!(s.handle_reply("wa:1", "simpan").unwrap().is_none());
    assert_eq!(s.ledger().writes.len(), 1);
}

#[test]
fn storage_failure_allows_retry() {
    let mut s = session();
    s.handle_photo("wa:1", b"INDOMARET\nTOTAL 20.000\n").unwrap();
    s.ledger().fail_next.set(true);

    let err = s.handle_reply("wa:1", "simpan").unwrap_err();
    assert!(err.to_string().contains("ledger offline"));
    assert!(s.book().is_pending("wa:1"));

    let outcome = s.handle_reply("wa:1", "ya").unwrap().unwrap();
    assert_eq!(outcome.status, ConfirmationStatus::Confirmed);
    assert_eq!(s.ledger().writes, vec![20_000]);
}

#[test]
fn last_photo_wins() {
    let mut s = session();
    s.handle_photo("wa:1", b"TOKO A\nTOTAL 10.000\n").unwrap();
    s.handle_photo("wa:1", b"TOKO B\nTOTAL 30.000\n").unwrap();

    s.handle_reply("wa:1", "simpan").unwrap();

    assert_eq!(s.ledger().writes, vec![30_000]);
    assert!(s.book().is_empty());
}

#[test]
fn unrelated_chatter_keeps_waiting() {
    let mut s = session();
    s.handle_photo("wa:1", b"TOKO A\nTOTAL 10.000\n").unwrap();

    let outcome = s.handle_reply("wa:1", "sebentar ya").unwrap().unwrap();

    assert!(!outcome.terminal);
    assert!(outcome.reply_text.contains("`simpan`"));
    assert!(s.book().is_pending("wa:1"));
    assert!(s.ledger().writes.is_empty());
}
