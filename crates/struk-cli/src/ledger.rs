//! JSON-lines ledger file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use struk_core::{DocumentType, ExtractionResult, Ledger, StorageError, TransactionId};

/// One confirmed transaction as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub id: TransactionId,
    pub recorded_at: DateTime<Local>,
    pub document_type: DocumentType,
    pub description: String,
    pub merchant: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: u64,
    pub category: Option<String>,
}

/// Appends one JSON object per confirmed transaction.
///
/// Ids continue from the number of records already in the file.
pub struct JsonlLedger {
    path: PathBuf,
    next_id: u64,
}

impl JsonlLedger {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let existing = if path.exists() {
            BufReader::new(File::open(path)?)
                .lines()
                .filter(|l| l.as_ref().map_or(true, |l| !l.trim().is_empty()))
                .count() as u64
        } else {
            0
        };
        debug!("Ledger {} has {} records", path.display(), existing);

        Ok(Self {
            path: path.to_path_buf(),
            next_id: existing + 1,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Ledger for JsonlLedger {
    fn persist(&mut self, result: &ExtractionResult) -> Result<TransactionId, StorageError> {
        let amount = result
            .require_amount()
            .map_err(|e| StorageError::Rejected(e.to_string()))?;

        let id = TransactionId(self.next_id);
        let record = LedgerRecord {
            id,
            recorded_at: Local::now(),
            document_type: result.document_type,
            description: result.description(),
            merchant: result.merchant.value.clone(),
            date: result.date.value,
            amount,
            category: result.category.value.clone(),
        };
        let line =
            serde_json::to_string(&record).map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;

        self.next_id += 1;
        Ok(id)
    }
}
