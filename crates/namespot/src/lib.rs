//! Capture-to-name-extraction pipeline.
//!
//! Frames flow strictly downward: camera -> preprocessor -> recognizer ->
//! name extractor -> (annotation renderer, result store). The monitoring
//! loop wraps the pipeline; nothing flows back upward except the extracted
//! name list and artifact paths.

pub mod annotate;
pub mod cli;
pub mod extract;
pub mod monitor;
pub mod pipeline;
pub mod preprocess;
pub mod settings;
pub mod store;
