//! Shared domain models for the namespot workspace.
//!
//! This crate centralizes the lightweight data structures used across the
//! camera, OCR, and pipeline crates. Keep it backend-agnostic so capability
//! crates can depend on it without pulling native SDKs or heavy features.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

pub type DetectResult<T> = Result<T, DetectError>;

/// Pixel-space bounding box of a recognized token, in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl TokenBox {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A single word produced by the text recognizer, with its location and a
/// confidence score in the 0-100 range.
#[derive(Debug, Clone, Serialize)]
pub struct RecognizedToken {
    pub text: String,
    pub bounds: TokenBox,
    pub confidence: f32,
}

impl RecognizedToken {
    pub fn new(text: impl Into<String>, bounds: TokenBox, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bounds,
            confidence,
        }
    }
}

/// Outcome of one capture-and-detect cycle. Immutable after construction;
/// the paths reference artifacts written by the result store under the same
/// timestamp key.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    pub timestamp_id: String,
    pub original_path: PathBuf,
    pub annotated_path: Option<PathBuf>,
    pub raw_text: String,
    pub names: Vec<String>,
}

/// Mutable bookkeeping for one monitoring run. Only the monitoring loop
/// touches this; it is dropped when the loop exits.
#[derive(Debug, Clone)]
pub struct MonitoringSession {
    pub interval: Duration,
    pub capture_count: u64,
    pub running: bool,
}

impl MonitoringSession {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            capture_count: 0,
            running: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("capability {capability} is unavailable: {reason}")]
    CapabilityUnavailable {
        capability: &'static str,
        reason: String,
    },

    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: String },

    #[error("transient capture failure: {reason}")]
    TransientCapture { reason: String },

    #[error("failed to persist {path}: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DetectError {
    pub fn capability_unavailable(capability: &'static str, reason: impl Into<String>) -> Self {
        Self::CapabilityUnavailable {
            capability,
            reason: reason.into(),
        }
    }

    pub fn invalid_frame(reason: impl Into<String>) -> Self {
        Self::InvalidFrame {
            reason: reason.into(),
        }
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        Self::TransientCapture {
            reason: reason.into(),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for failures that must abort the process rather than a single
    /// capture or loop iteration.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CapabilityUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_failures_are_fatal() {
        let err = DetectError::capability_unavailable("recognizer", "binary not found");
        assert!(err.is_fatal());
        assert!(!DetectError::invalid_frame("empty").is_fatal());
        assert!(!DetectError::transient("device busy").is_fatal());
    }

    #[test]
    fn error_messages_name_the_failing_part() {
        let err = DetectError::capability_unavailable("camera", "no device");
        assert_eq!(
            err.to_string(),
            "capability camera is unavailable: no device"
        );
        let err = DetectError::persistence(
            "/tmp/results_x.txt",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(err.to_string().contains("/tmp/results_x.txt"));
    }
}
