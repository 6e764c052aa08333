use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("recognizer unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("backend error: {message}")]
    Backend { message: String },
}

impl OcrError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
