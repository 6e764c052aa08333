use std::path::PathBuf;

use image::RgbImage;
use namespot_types::{DetectError, DetectResult};

use crate::controls::{CameraControls, Resolution};
use crate::source::FrameSource;

const STILL_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Replays still images from a directory in filename order.
///
/// Useful for exercising the full pipeline against saved captures without
/// camera hardware. Exhausting the directory is a transient failure so the
/// monitoring loop keeps polling; new files dropped into the directory are
/// picked up on the next scan.
#[derive(Debug)]
pub struct StillCamera {
    dir: PathBuf,
    queue: Vec<PathBuf>,
    cursor: usize,
    started: bool,
}

impl StillCamera {
    pub fn open(dir: PathBuf) -> DetectResult<Self> {
        if !dir.is_dir() {
            return Err(DetectError::capability_unavailable(
                "camera",
                format!("still source directory {} does not exist", dir.display()),
            ));
        }
        Ok(Self {
            dir,
            queue: Vec::new(),
            cursor: 0,
            started: false,
        })
    }

    fn rescan(&mut self) -> DetectResult<()> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| STILL_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        self.queue = files;
        self.cursor = 0;
        Ok(())
    }
}

impl FrameSource for StillCamera {
    fn name(&self) -> &'static str {
        "still"
    }

    fn configure(&mut self, _resolution: Resolution, _controls: &CameraControls) -> DetectResult<()> {
        // Stills come at their native resolution; controls do not apply.
        Ok(())
    }

    fn start(&mut self) -> DetectResult<()> {
        self.rescan()?;
        self.started = true;
        log::debug!(
            "still source opened with {} image(s) in {}",
            self.queue.len(),
            self.dir.display()
        );
        Ok(())
    }

    fn capture_frame(&mut self) -> DetectResult<RgbImage> {
        if !self.started {
            return Err(DetectError::transient("still source is not started"));
        }
        if self.cursor >= self.queue.len() {
            self.rescan()?;
            if self.queue.is_empty() {
                return Err(DetectError::transient(format!(
                    "no images left in {}",
                    self.dir.display()
                )));
            }
        }
        let path = self.queue[self.cursor].clone();
        self.cursor += 1;
        let image = image::open(&path).map_err(|err| {
            DetectError::invalid_frame(format!("failed to decode {}: {err}", path.display()))
        })?;
        Ok(image.to_rgb8())
    }

    fn stop(&mut self) {
        self.started = false;
        self.queue.clear();
    }
}
