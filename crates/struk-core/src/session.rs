//! Conversation glue: photo in, reply out.

use tracing::{debug, info};

use crate::confirmation::{ConfirmationBook, ReplyOutcome};
use crate::error::Result;
use crate::ledger::Ledger;
use crate::models::config::StrukConfig;
use crate::models::receipt::ExtractionResult;
use crate::ocr::TextRecognizer;
use crate::receipt::{LineBlock, ReceiptExtractor};

/// Reply sent when a text message arrives with nothing pending.
pub const IDLE_REPLY: &str = "Kirim foto struk atau bukti transfer untuk dicatat ya, Kak.";

/// One transport's view of the receipt flow.
pub struct ReceiptSession<R, L> {
    extractor: ReceiptExtractor,
    recognizer: R,
    ledger: L,
    book: ConfirmationBook,
}

impl<R: TextRecognizer, L: Ledger> ReceiptSession<R, L> {
    pub fn new(config: &StrukConfig, recognizer: R, ledger: L) -> Self {
        let extractor = ReceiptExtractor::new(&config.extraction);
        let book = ConfirmationBook::new(*extractor.builder());
        Self {
            extractor,
            recognizer,
            ledger,
            book,
        }
    }

    /// Recognize and extract an uploaded photo, then hold it for confirmation.
    ///
    /// OCR failures propagate; the caller decides what to tell the user.
    pub fn handle_photo(&mut self, conversation: &str, image: &[u8]) -> Result<ExtractionResult> {
        let lines = self.recognizer.recognize(image)?;
        debug!("Conversation {}: {} OCR lines", conversation, lines.len());

        let result = self.extractor.extract_block(&LineBlock::new(&lines));
        self.book.begin(conversation, result.clone());
        Ok(result)
    }

    /// Route a text reply. `Ok(None)` means nothing was pending.
    pub fn handle_reply(&mut self, conversation: &str, text: &str) -> Result<Option<ReplyOutcome>> {
        let outcome = self
            .book
            .handle_confirmation_reply(conversation, text, &mut self.ledger)?;

        if let Some(outcome) = &outcome {
            info!("Conversation {}: {:?}", conversation, outcome.status);
        }
        Ok(outcome)
    }

    pub fn book(&self) -> &ConfirmationBook {
        &self.book
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn into_ledger(self) -> L {
        self.ledger
    }
}
