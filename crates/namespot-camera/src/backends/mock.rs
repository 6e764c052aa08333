use image::{Rgb, RgbImage};
use namespot_types::{DetectError, DetectResult};

use crate::controls::{CameraControls, Resolution};
use crate::source::FrameSource;

/// Synthetic frame source for tests and CI.
///
/// Produces a light card with dark horizontal bands where printed text
/// lines would sit, so downstream preprocessing has realistic foreground
/// and background populations to threshold.
pub struct MockCamera {
    resolution: Resolution,
    started: bool,
    frame_index: u64,
}

impl MockCamera {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            started: false,
            frame_index: 0,
        }
    }

    pub fn frames_captured(&self) -> u64 {
        self.frame_index
    }
}

impl FrameSource for MockCamera {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn configure(&mut self, resolution: Resolution, _controls: &CameraControls) -> DetectResult<()> {
        if resolution.width == 0 || resolution.height == 0 {
            return Err(DetectError::configuration(
                "mock camera resolution must be non-zero",
            ));
        }
        self.resolution = resolution;
        Ok(())
    }

    fn start(&mut self) -> DetectResult<()> {
        self.started = true;
        Ok(())
    }

    fn capture_frame(&mut self) -> DetectResult<RgbImage> {
        if !self.started {
            return Err(DetectError::transient("mock camera is not started"));
        }
        let Resolution { width, height } = self.resolution;
        let index = self.frame_index;
        self.frame_index += 1;

        let band_period = (height / 12).max(8);
        let frame = RgbImage::from_fn(width, height, |_x, y| {
            let phase = (y + (index as u32 % band_period)) % band_period;
            if phase < band_period / 4 {
                Rgb([30, 30, 30])
            } else {
                Rgb([220, 220, 215])
            }
        });
        Ok(frame)
    }

    fn stop(&mut self) {
        self.started = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_before_start_is_transient() {
        let mut camera = MockCamera::new(Resolution::new(64, 48));
        assert!(matches!(
            camera.capture_frame(),
            Err(DetectError::TransientCapture { .. })
        ));
    }

    #[test]
    fn frames_match_the_configured_resolution() {
        let mut camera = MockCamera::new(Resolution::default());
        camera
            .configure(Resolution::new(320, 240), &CameraControls::default())
            .unwrap();
        camera.start().unwrap();
        let frame = camera.capture_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (320, 240));
        assert_eq!(camera.frames_captured(), 1);
    }

    #[test]
    fn frames_contain_two_tone_bands() {
        let mut camera = MockCamera::new(Resolution::new(100, 100));
        camera.start().unwrap();
        let frame = camera.capture_frame().unwrap();
        let dark = frame.pixels().filter(|p| p.0[0] < 128).count();
        let light = frame.pixels().filter(|p| p.0[0] >= 128).count();
        assert!(dark > 0 && light > 0);
    }
}
