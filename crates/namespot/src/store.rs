//! Artifact persistence: frames and the structured report.
//!
//! Everything from one capture shares a single timestamp key, so the
//! original frame, the optional annotated frame, and the report can be
//! correlated later without a database.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use image::RgbImage;
use namespot_types::{DetectError, DetectResult, DetectionResult};
use tempfile::NamedTempFile;

const ORIGINAL_PREFIX: &str = "capture";
const ANNOTATED_PREFIX: &str = "annotated";
const REPORT_PREFIX: &str = "results";
const REPORT_HEADER: &str = "NAME DETECTION RESULTS";
const HEADER_SEPARATOR: &str = "==================================================";
const RAW_TEXT_MARKER: &str = "----------------------------------------";

#[derive(Debug)]
pub struct ResultStore {
    output_dir: PathBuf,
}

impl ResultStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> DetectResult<Self> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)
            .map_err(|err| DetectError::persistence(&output_dir, err))?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Second-resolution key shared by all artifacts of one capture.
    pub fn timestamp_id() -> String {
        Local::now().format("%Y%m%d_%H%M%S").to_string()
    }

    /// Persists one detection: original frame, optional annotated frame,
    /// and the report. Frames are written first; the report is written to a
    /// temp file and renamed into place so a partially written report never
    /// replaces a complete one. If the report fails, the frames written for
    /// this capture are removed again so no artifact references a report
    /// that does not exist.
    pub fn save(
        &self,
        timestamp_id: &str,
        original: &RgbImage,
        annotated: Option<&RgbImage>,
        raw_text: &str,
        names: &[String],
    ) -> DetectResult<DetectionResult> {
        let original_path = self.frame_path(ORIGINAL_PREFIX, timestamp_id);
        let annotated_path = annotated.map(|_| self.frame_path(ANNOTATED_PREFIX, timestamp_id));
        let report_path = self.report_path(timestamp_id);

        self.write_frame(original, &original_path)?;
        if let (Some(image), Some(path)) = (annotated, annotated_path.as_ref()) {
            if let Err(err) = self.write_frame(image, path) {
                let _ = std::fs::remove_file(&original_path);
                return Err(err);
            }
        }

        let result = DetectionResult {
            timestamp_id: timestamp_id.to_string(),
            original_path: original_path.clone(),
            annotated_path: annotated_path.clone(),
            raw_text: raw_text.to_string(),
            names: names.to_vec(),
        };

        if let Err(err) = self.write_report(&report_path, &result) {
            let _ = std::fs::remove_file(&original_path);
            if let Some(path) = annotated_path {
                let _ = std::fs::remove_file(path);
            }
            return Err(err);
        }

        log::debug!(
            "persisted capture {timestamp_id}: {} name(s), report {}",
            result.names.len(),
            report_path.display()
        );
        Ok(result)
    }

    fn frame_path(&self, prefix: &str, timestamp_id: &str) -> PathBuf {
        self.output_dir.join(format!("{prefix}_{timestamp_id}.jpg"))
    }

    fn report_path(&self, timestamp_id: &str) -> PathBuf {
        self.output_dir
            .join(format!("{REPORT_PREFIX}_{timestamp_id}.txt"))
    }

    fn write_frame(&self, frame: &RgbImage, path: &Path) -> DetectResult<()> {
        frame.save(path).map_err(|err| {
            DetectError::persistence(path, std::io::Error::other(err.to_string()))
        })
    }

    fn write_report(&self, path: &Path, result: &DetectionResult) -> DetectResult<()> {
        let body = format_report(result);
        let mut file = NamedTempFile::new_in(&self.output_dir)
            .map_err(|err| DetectError::persistence(path, err))?;
        file.write_all(body.as_bytes())
            .map_err(|err| DetectError::persistence(path, err))?;
        file.persist(path)
            .map_err(|err| DetectError::persistence(path, err.error))?;
        Ok(())
    }
}

/// Report field order is stable; downstream consumers parse it.
fn format_report(result: &DetectionResult) -> String {
    let mut body = String::new();
    body.push_str(&format!("{REPORT_HEADER} - {}\n", result.timestamp_id));
    body.push_str(HEADER_SEPARATOR);
    body.push('\n');
    body.push_str(&format!(
        "Original image: {}\n",
        file_name(&result.original_path)
    ));
    if let Some(path) = &result.annotated_path {
        body.push_str(&format!("Annotated image: {}\n", file_name(path)));
    }
    body.push_str(&format!("Raw text ({} bytes):\n", result.raw_text.len()));
    body.push_str(RAW_TEXT_MARKER);
    body.push('\n');
    body.push_str(&result.raw_text);
    body.push('\n');
    body.push_str(RAW_TEXT_MARKER);
    body.push('\n');
    body.push_str(&format!("Names found: {}\n", result.names.len()));
    for (index, name) in result.names.iter().enumerate() {
        body.push_str(&format!("{}. {name}\n", index + 1));
    }
    body
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Parses a report back into a [`DetectionResult`]. The inverse of
/// [`ResultStore::save`]'s report format, used for audits and tests. The
/// declared byte count delimits the raw-text block, so the text is
/// recovered verbatim even when it lacks a trailing newline or contains a
/// line equal to the block marker.
pub fn read_report(path: &Path) -> DetectResult<DetectionResult> {
    let contents =
        std::fs::read_to_string(path).map_err(|err| DetectError::persistence(path, err))?;

    let marker_line = format!("{RAW_TEXT_MARKER}\n");
    let (head, rest) = contents
        .split_once(&marker_line)
        .ok_or_else(|| malformed(path, "missing raw text block"))?;
    let mut lines = head.lines();

    let header = lines
        .next()
        .ok_or_else(|| malformed(path, "empty report"))?;
    let timestamp_id = header
        .strip_prefix(REPORT_HEADER)
        .and_then(|rest| rest.strip_prefix(" - "))
        .ok_or_else(|| malformed(path, "missing header"))?
        .to_string();
    if lines.next() != Some(HEADER_SEPARATOR) {
        return Err(malformed(path, "missing separator"));
    }

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut line = lines.next().ok_or_else(|| malformed(path, "truncated"))?;
    let original_path = dir.join(
        line.strip_prefix("Original image: ")
            .ok_or_else(|| malformed(path, "missing original image"))?,
    );

    line = lines.next().ok_or_else(|| malformed(path, "truncated"))?;
    let annotated_path = if let Some(name) = line.strip_prefix("Annotated image: ") {
        let annotated = dir.join(name);
        line = lines.next().ok_or_else(|| malformed(path, "truncated"))?;
        Some(annotated)
    } else {
        None
    };

    let byte_count: usize = line
        .strip_prefix("Raw text (")
        .and_then(|l| l.strip_suffix(" bytes):"))
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| malformed(path, "missing raw text length"))?;
    if lines.next().is_some() {
        return Err(malformed(path, "unexpected content before raw text"));
    }

    if rest.len() < byte_count || !rest.is_char_boundary(byte_count) {
        return Err(malformed(path, "raw text shorter than declared"));
    }
    let raw_text = rest[..byte_count].to_string();
    let tail = rest[byte_count..]
        .strip_prefix('\n')
        .and_then(|t| t.strip_prefix(&marker_line))
        .ok_or_else(|| malformed(path, "unterminated raw text block"))?;

    let mut lines = tail.lines();
    let counts = lines
        .next()
        .and_then(|l| l.strip_prefix("Names found: "))
        .ok_or_else(|| malformed(path, "missing name count"))?;
    let expected: usize = counts
        .trim()
        .parse()
        .map_err(|_| malformed(path, "bad name count"))?;
    let names: Vec<String> = lines
        .filter(|l| !l.is_empty())
        .map(|l| {
            l.split_once(". ")
                .map(|(_, name)| name.to_string())
                .ok_or_else(|| malformed(path, "bad name entry"))
        })
        .collect::<DetectResult<_>>()?;
    if names.len() != expected {
        return Err(malformed(path, "name count mismatch"));
    }

    Ok(DetectionResult {
        timestamp_id,
        original_path,
        annotated_path,
        raw_text,
        names,
    })
}

fn malformed(path: &Path, reason: &str) -> DetectError {
    DetectError::persistence(
        path,
        std::io::Error::new(std::io::ErrorKind::InvalidData, reason.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn frame() -> RgbImage {
        RgbImage::from_pixel(8, 8, Rgb([128, 128, 128]))
    }

    #[test]
    fn save_writes_all_three_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path()).unwrap();
        let result = store
            .save(
                "20260830_120000",
                &frame(),
                Some(&frame()),
                "Dr. Jane Smith\n",
                &["Dr. Jane Smith".to_string()],
            )
            .unwrap();
        assert!(result.original_path.exists());
        assert!(result.annotated_path.as_ref().unwrap().exists());
        assert!(dir.path().join("results_20260830_120000.txt").exists());
    }

    #[test]
    fn annotated_line_is_absent_without_annotation() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path()).unwrap();
        let result = store
            .save("20260830_120001", &frame(), None, "nothing", &[])
            .unwrap();
        assert!(result.annotated_path.is_none());
        let report = std::fs::read_to_string(dir.path().join("results_20260830_120001.txt")).unwrap();
        assert!(!report.contains("Annotated image:"));
        assert!(report.contains("Names found: 0"));
    }

    #[test]
    fn report_round_trips_names_and_raw_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path()).unwrap();
        let raw = "Dr. Jane Smith\nsome noise\nJohn Doe";
        let names = vec!["Dr. Jane Smith".to_string(), "John Doe".to_string()];
        let saved = store
            .save("20260830_120002", &frame(), Some(&frame()), raw, &names)
            .unwrap();

        let parsed = read_report(&dir.path().join("results_20260830_120002.txt")).unwrap();
        assert_eq!(parsed.timestamp_id, saved.timestamp_id);
        assert_eq!(parsed.raw_text, raw);
        assert_eq!(parsed.names, names);
        assert_eq!(parsed.original_path, saved.original_path);
        assert_eq!(parsed.annotated_path, saved.annotated_path);
    }

    #[test]
    fn trailing_newline_in_raw_text_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path()).unwrap();
        let raw = "Dr. Jane Smith\nJohn Doe\n";
        store
            .save("20260830_120010", &frame(), None, raw, &[])
            .unwrap();
        let parsed = read_report(&dir.path().join("results_20260830_120010.txt")).unwrap();
        assert_eq!(parsed.raw_text, raw);

        let bare = "Dr. Jane Smith\nJohn Doe";
        store
            .save("20260830_120011", &frame(), None, bare, &[])
            .unwrap();
        let parsed = read_report(&dir.path().join("results_20260830_120011.txt")).unwrap();
        assert_eq!(parsed.raw_text, bare);
    }

    #[test]
    fn raw_text_containing_the_marker_line_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path()).unwrap();
        let raw = format!("Jane Smith\n{RAW_TEXT_MARKER}\nJohn Doe");
        store
            .save("20260830_120012", &frame(), None, &raw, &[])
            .unwrap();
        let parsed = read_report(&dir.path().join("results_20260830_120012.txt")).unwrap();
        assert_eq!(parsed.raw_text, raw);
    }

    #[test]
    fn names_containing_dots_survive_the_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path()).unwrap();
        let names = vec!["John Q. Public".to_string()];
        store
            .save("20260830_120003", &frame(), None, "John Q. Public", &names)
            .unwrap();
        let parsed = read_report(&dir.path().join("results_20260830_120003.txt")).unwrap();
        assert_eq!(parsed.names, names);
    }

    #[test]
    fn unwritable_directory_is_a_persistence_error() {
        let err = ResultStore::new("/proc/namespot-definitely-unwritable").unwrap_err();
        assert!(matches!(err, DetectError::Persistence { .. }));
    }
}
