//! Configuration structures for the extraction engine and its glue.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for struk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrukConfig {
    /// Extraction and confidence settings.
    pub extraction: ExtractionConfig,

    /// Ledger used by the CLI chat loop.
    pub ledger: LedgerConfig,

    /// Chat loop defaults.
    pub chat: ChatConfig,
}

/// Extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Results below this confidence need manual confirmation (0.0 - 1.0).
    pub low_confidence_threshold: f32,

    /// Lines shorter than this (in characters) count as illegible.
    pub min_legible_len: usize,

    /// Share of symbol-run characters above which a line is garbled.
    pub garble_density: f32,

    /// Number of leading lines searched for the merchant name.
    pub merchant_lines: usize,

    /// Smallest scanned token accepted as an amount.
    pub min_amount: u64,

    /// Largest scanned token accepted as an amount.
    pub max_amount: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            low_confidence_threshold: 0.5,
            min_legible_len: 3,
            garble_density: 0.3,
            merchant_lines: 3,
            min_amount: 100,
            max_amount: 2_000_000_000,
        }
    }
}

/// Ledger file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON-lines file confirmed transactions are appended to.
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("struk-ledger.jsonl"),
        }
    }
}

/// Chat loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Conversation id used when none is given on the command line.
    pub conversation_id: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            conversation_id: "local".to_string(),
        }
    }
}

impl StrukConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
