use std::collections::HashMap;

use image::{DynamicImage, GrayImage};
use namespot_types::{RecognizedToken, TokenBox};
use rusty_tesseract::{Args, Image};

use crate::engine::TextRecognizer;
use crate::error::OcrError;
use crate::filter::AlphabetFilter;

/// Page segmentation mode 6: assume a single uniform block of text.
const PSM_SINGLE_BLOCK: i32 = 6;
/// Default engine mode (LSTM where available).
const OEM_DEFAULT: i32 = 3;

/// Recognizer backed by the system `tesseract` binary via rusty-tesseract.
#[derive(Debug)]
pub struct TesseractRecognizer {
    lang: String,
    dpi: i32,
}

impl TesseractRecognizer {
    pub fn new() -> Self {
        Self {
            lang: "eng".to_string(),
            dpi: 150,
        }
    }

    pub fn with_language(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    fn args(&self, filter: Option<&AlphabetFilter>) -> Args {
        let mut config_variables = HashMap::new();
        if let Some(filter) = filter {
            config_variables.insert(
                "tessedit_char_whitelist".to_string(),
                filter.whitelist().to_string(),
            );
        }
        Args {
            lang: self.lang.clone(),
            config_variables,
            dpi: Some(self.dpi),
            psm: Some(PSM_SINGLE_BLOCK),
            oem: Some(OEM_DEFAULT),
        }
    }

    fn tess_image(image: &GrayImage) -> Result<Image, OcrError> {
        let dynamic = DynamicImage::ImageLuma8(image.clone());
        Image::from_dynamic_image(&dynamic)
            .map_err(|err| OcrError::backend(format!("failed to prepare image: {err}")))
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        match rusty_tesseract::get_tesseract_version() {
            Ok(version) => {
                log::debug!("tesseract available: {}", version.trim());
                true
            }
            Err(err) => {
                log::debug!("tesseract probe failed: {err}");
                false
            }
        }
    }

    fn recognize_text(
        &self,
        image: &GrayImage,
        filter: &AlphabetFilter,
    ) -> Result<String, OcrError> {
        let tess_img = Self::tess_image(image)?;
        rusty_tesseract::image_to_string(&tess_img, &self.args(Some(filter)))
            .map_err(|err| OcrError::backend(format!("tesseract recognition failed: {err}")))
    }

    fn recognize_tokens(&self, image: &GrayImage) -> Result<Vec<RecognizedToken>, OcrError> {
        let tess_img = Self::tess_image(image)?;
        let output = rusty_tesseract::image_to_data(&tess_img, &self.args(None))
            .map_err(|err| OcrError::backend(format!("tesseract word data failed: {err}")))?;

        // Word-level records only; structural rows carry conf -1 and empty text.
        let tokens = output
            .data
            .into_iter()
            .filter(|d| d.conf > 0.0 && !d.text.trim().is_empty())
            .map(|d| {
                RecognizedToken::new(
                    d.text.trim().to_string(),
                    TokenBox::new(d.left, d.top, d.width.max(0) as u32, d.height.max(0) as u32),
                    d.conf,
                )
            })
            .collect();
        Ok(tokens)
    }
}
