//! Text recognition capability consumed by the detection pipeline.

mod backends;
mod engine;
mod error;
mod filter;

#[cfg(feature = "engine-tesseract")]
pub use backends::tesseract::TesseractRecognizer;
pub use engine::{NoopRecognizer, TextRecognizer};
pub use error::OcrError;
pub use filter::AlphabetFilter;
