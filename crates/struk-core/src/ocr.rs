//! Text recognition seam.

use tracing::debug;

use crate::error::OcrError;

/// Turns an uploaded image into OCR text lines, top to bottom.
///
/// Implementations may block; callers are expected to run them off any
/// latency-sensitive path.
pub trait TextRecognizer {
    fn recognize(&self, image: &[u8]) -> Result<Vec<String>, OcrError>;
}

impl<R: TextRecognizer + ?Sized> TextRecognizer for &R {
    fn recognize(&self, image: &[u8]) -> Result<Vec<String>, OcrError> {
        (**self).recognize(image)
    }
}

/// Recognizer over text that was already transcribed.
///
/// The "image" is the UTF-8 transcript itself, one OCR line per text line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptRecognizer;

impl TextRecognizer for TranscriptRecognizer {
    fn recognize(&self, image: &[u8]) -> Result<Vec<String>, OcrError> {
        let text = std::str::from_utf8(image)
            .map_err(|e| OcrError::Unavailable(format!("transcript is not UTF-8: {}", e)))?;

        let lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();

        if lines.is_empty() {
            return Err(OcrError::EmptyTranscript);
        }

        debug!("Transcript with {} lines", lines.len());
        Ok(lines)
    }
}
