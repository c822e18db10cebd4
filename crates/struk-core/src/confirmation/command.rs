//! Parsing of conversational replies to a pending extraction.

use std::fmt;

use crate::error::CorrectionError;

/// A field the user may overwrite with `ubah`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionField {
    Total,
    Category,
    Merchant,
    Date,
}

impl CorrectionField {
    pub const ALL: [CorrectionField; 4] = [Self::Total, Self::Category, Self::Merchant, Self::Date];

    fn from_word(word: &str) -> Option<Self> {
        match word {
            "total" | "nominal" | "jumlah" => Some(Self::Total),
            "kategori" | "category" => Some(Self::Category),
            "merchant" | "toko" => Some(Self::Merchant),
            "tanggal" | "tgl" => Some(Self::Date),
            _ => None,
        }
    }

    /// Example shown when the value is missing or unreadable.
    pub fn usage(&self) -> &'static str {
        match self {
            Self::Total => "Format ubah total: `ubah total 125000`",
            Self::Category => "Format ubah kategori: `ubah kategori Makanan & Minuman`",
            Self::Merchant => "Format ubah merchant: `ubah merchant Nama Toko`",
            Self::Date => "Format ubah tanggal: `ubah tanggal 13/02/2026`",
        }
    }
}

impl fmt::Display for CorrectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Total => "total",
            Self::Category => "kategori",
            Self::Merchant => "merchant",
            Self::Date => "tanggal",
        };
        f.write_str(name)
    }
}

/// What a reply asks the state machine to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyCommand {
    Save,
    Cancel,
    Correct { field: CorrectionField, value: String },
    Unrecognized,
}

/// Parse a reply. Only malformed `ubah` commands are errors.
pub fn parse_reply(text: &str) -> Result<ReplyCommand, CorrectionError> {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();

    match lower.as_str() {
        "simpan" | "ya" | "y" | "ok" | "oke" => return Ok(ReplyCommand::Save),
        "batal" | "tidak" | "ga" | "gak" => return Ok(ReplyCommand::Cancel),
        _ => {}
    }

    let mut words = trimmed.splitn(3, char::is_whitespace);
    if !words.next().is_some_and(|w| w.eq_ignore_ascii_case("ubah")) {
        return Ok(ReplyCommand::Unrecognized);
    }

    let field_word = words.next().unwrap_or("").to_lowercase();
    let field = CorrectionField::from_word(&field_word)
        .ok_or_else(|| CorrectionError::UnrecognizedField(field_word.clone()))?;

    let value = words.next().unwrap_or("").trim();
    if value.is_empty() {
        return Err(CorrectionError::EmptyValue(field.to_string()));
    }

    Ok(ReplyCommand::Correct {
        field,
        value: value.to_string(),
    })
}
