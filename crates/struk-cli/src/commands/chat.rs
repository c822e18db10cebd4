//! Chat command - a terminal stand-in for the messaging transport.
//!
//! `/foto <file>` submits a transcript as if it were a photo; any other
//! line is a reply to the pending receipt.

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::warn;

use struk_core::session::IDLE_REPLY;
use struk_core::{ReceiptSession, TranscriptRecognizer};

use crate::ledger::JsonlLedger;

const OCR_FAILED_REPLY: &str = "Maaf, struknya belum bisa dibaca. Coba kirim ulang fotonya ya, Kak.";
const STORAGE_FAILED_REPLY: &str = "Maaf, pencatatan gagal. Coba balas `simpan` lagi ya.";

/// Arguments for the chat command.
#[derive(Args)]
pub struct ChatArgs {
    /// Conversation id (default: from config)
    #[arg(long)]
    conversation: Option<String>,

    /// JSON-lines ledger file (default: from config)
    #[arg(short, long)]
    ledger: Option<PathBuf>,
}

pub fn run(args: ChatArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let conversation = args
        .conversation
        .unwrap_or_else(|| config.chat.conversation_id.clone());
    let ledger_path = args.ledger.unwrap_or_else(|| config.ledger.path.clone());

    let ledger = JsonlLedger::open(&ledger_path)?;
    let mut session = ReceiptSession::new(&config, TranscriptRecognizer, ledger);

    eprintln!(
        "{} Ledger: {}. Kirim `/foto <file>` atau `/keluar`.",
        style("ℹ").blue(),
        session.ledger().path().display()
    );

    for line in io::stdin().lock().lines() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == "/keluar" || text == "/quit" {
            break;
        }

        let reply = match text.strip_prefix("/foto") {
            Some(path) => photo_reply(&mut session, &conversation, path.trim()),
            None => match session.handle_reply(&conversation, text) {
                Ok(Some(outcome)) => outcome.reply_text,
                Ok(None) => IDLE_REPLY.to_string(),
                Err(e) => {
                    warn!("Reply failed: {}", e);
                    STORAGE_FAILED_REPLY.to_string()
                }
            },
        };

        println!("{}\n", reply);
    }

    Ok(())
}

fn photo_reply(
    session: &mut ReceiptSession<TranscriptRecognizer, JsonlLedger>,
    conversation: &str,
    path: &str,
) -> String {
    if path.is_empty() {
        return "Format: `/foto <file transkrip>`".to_string();
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("{} Cannot read {}: {}", style("✗").red(), path, e);
            return OCR_FAILED_REPLY.to_string();
        }
    };

    match session.handle_photo(conversation, &bytes) {
        Ok(result) => result.reply_text,
        Err(e) => {
            warn!("Photo {} failed: {}", path, e);
            OCR_FAILED_REPLY.to_string()
        }
    }
}
