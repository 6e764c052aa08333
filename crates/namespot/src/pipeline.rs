//! Composition of the capture stages into one re-entrant operation.

use std::sync::Arc;
use std::time::Duration;

use namespot_camera::DynFrameSource;
use namespot_ocr::{AlphabetFilter, OcrError, TextRecognizer};
use namespot_types::{DetectError, DetectResult, DetectionResult};

use crate::annotate;
use crate::extract::extract_names;
use crate::preprocess;
use crate::store::ResultStore;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Tokens at or below this confidence are excluded from annotation.
    pub min_confidence: f32,
    /// Structuring-element radius for the preprocessing closing pass.
    pub closing_radius: u8,
    /// Wait after camera start for auto-exposure/white-balance convergence.
    pub settle_delay: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_confidence: annotate::DEFAULT_MIN_CONFIDENCE,
            closing_radius: preprocess::DEFAULT_CLOSING_RADIUS,
            settle_delay: Duration::from_secs(2),
        }
    }
}

/// Owns both capabilities for the session. At most one capture is ever in
/// flight; each call runs the stage sequence Capturing -> Preprocessing ->
/// Recognizing -> Extracting -> (Annotating) -> Persisting to completion or
/// aborts the whole call on the first stage failure.
pub struct DetectionPipeline {
    source: DynFrameSource,
    recognizer: Arc<dyn TextRecognizer>,
    store: ResultStore,
    filter: AlphabetFilter,
    settings: PipelineSettings,
}

impl DetectionPipeline {
    /// Acquires the capabilities. The recognizer must answer its
    /// availability probe and the camera must start; both are fatal startup
    /// failures otherwise, reported before any capture is attempted. The
    /// settle delay runs here so the first capture sees converged exposure.
    pub fn new(
        mut source: DynFrameSource,
        recognizer: Arc<dyn TextRecognizer>,
        store: ResultStore,
        settings: PipelineSettings,
    ) -> DetectResult<Self> {
        if !recognizer.is_available() {
            return Err(DetectError::capability_unavailable(
                "recognizer",
                format!("{} backend did not answer its probe", recognizer.name()),
            ));
        }
        source.start()?;
        if !settings.settle_delay.is_zero() {
            log::debug!(
                "camera {} started; settling for {:?}",
                source.name(),
                settings.settle_delay
            );
            std::thread::sleep(settings.settle_delay);
        }
        Ok(Self {
            source,
            recognizer,
            store,
            filter: AlphabetFilter::default(),
            settings,
        })
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// One-shot operation: capture, detect, persist. The annotated frame is
    /// produced only when requested AND at least one name was found.
    pub fn capture_and_detect(&mut self, request_annotation: bool) -> DetectResult<DetectionResult> {
        let timestamp_id = ResultStore::timestamp_id();
        let (frame, binary, raw_text, names) = self.detect(&timestamp_id)?;

        let annotated = if request_annotation && !names.is_empty() {
            log::debug!("[{timestamp_id}] annotating");
            let tokens = self
                .recognizer
                .recognize_tokens(&binary)
                .map_err(map_ocr_error)?;
            Some(annotate::render_annotated(
                &frame,
                &names,
                &tokens,
                self.settings.min_confidence,
            ))
        } else {
            None
        };

        log::debug!("[{timestamp_id}] persisting");
        self.store
            .save(&timestamp_id, &frame, annotated.as_ref(), &raw_text, &names)
    }

    /// Reduced cycle for the monitoring loop: no annotation, and captures
    /// without names are discarded instead of persisted.
    pub fn monitor_cycle(&mut self) -> DetectResult<Option<DetectionResult>> {
        let timestamp_id = ResultStore::timestamp_id();
        let (frame, _binary, raw_text, names) = self.detect(&timestamp_id)?;
        if names.is_empty() {
            log::debug!("[{timestamp_id}] no names; skipping persistence");
            return Ok(None);
        }
        self.store
            .save(&timestamp_id, &frame, None, &raw_text, &names)
            .map(Some)
    }

    fn detect(
        &mut self,
        timestamp_id: &str,
    ) -> DetectResult<(image::RgbImage, image::GrayImage, String, Vec<String>)> {
        log::debug!("[{timestamp_id}] capturing");
        let frame = self.source.capture_frame()?;
        log::debug!("[{timestamp_id}] preprocessing");
        let binary = preprocess::prepare_for_ocr(&frame, self.settings.closing_radius)?;
        log::debug!("[{timestamp_id}] recognizing");
        let raw_text = self
            .recognizer
            .recognize_text(&binary, &self.filter)
            .map_err(map_ocr_error)?;
        log::debug!("[{timestamp_id}] extracting");
        let names = extract_names(&raw_text);
        Ok((frame, binary, raw_text, names))
    }

    pub fn shutdown(&mut self) {
        self.source.stop();
    }
}

impl Drop for DetectionPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn map_ocr_error(err: OcrError) -> DetectError {
    match err {
        OcrError::Unavailable { reason } => {
            DetectError::capability_unavailable("recognizer", reason)
        }
        OcrError::Backend { message } => DetectError::transient(message),
    }
}
