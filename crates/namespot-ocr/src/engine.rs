use image::GrayImage;
use namespot_types::RecognizedToken;

use crate::error::OcrError;
use crate::filter::AlphabetFilter;

/// Common interface for all text recognizers.
pub trait TextRecognizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap availability probe. Called once before the pipeline starts; a
    /// `false` here is a fatal startup condition, not a per-capture error.
    fn is_available(&self) -> bool;

    /// Full-page recognition, newline-delimited lines.
    fn recognize_text(&self, image: &GrayImage, filter: &AlphabetFilter)
    -> Result<String, OcrError>;

    /// Per-word recognition with bounding boxes and 0-100 confidence.
    fn recognize_tokens(&self, image: &GrayImage) -> Result<Vec<RecognizedToken>, OcrError>;
}

/// Placeholder recognizer used while no real backend is wired.
#[derive(Debug, Default)]
pub struct NoopRecognizer;

impl TextRecognizer for NoopRecognizer {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn recognize_text(&self, _: &GrayImage, _: &AlphabetFilter) -> Result<String, OcrError> {
        Ok(String::new())
    }

    fn recognize_tokens(&self, _: &GrayImage) -> Result<Vec<RecognizedToken>, OcrError> {
        Ok(Vec::new())
    }
}
