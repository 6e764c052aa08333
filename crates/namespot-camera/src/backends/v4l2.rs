use std::path::PathBuf;

use image::RgbImage;
use namespot_types::{DetectError, DetectResult};
use v4l::buffer::Type;
use v4l::control::{Control, Value};
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

use crate::controls::{CameraControls, Resolution};
use crate::source::FrameSource;

const DEFAULT_DEVICE: &str = "/dev/video0";
const STREAM_BUFFERS: u32 = 4;
/// Frames dequeued and discarded before the one we keep; the first buffers
/// out of a freshly started stream are often stale or half-exposed.
const WARMUP_FRAMES: usize = 2;

// Standard V4L2 user/camera-class control ids.
const CID_BRIGHTNESS: u32 = 0x0098_0900;
const CID_CONTRAST: u32 = 0x0098_0901;
const CID_AUTO_WHITE_BALANCE: u32 = 0x0098_090c;
const CID_GAIN: u32 = 0x0098_0913;
const CID_SHARPNESS: u32 = 0x0098_091b;
const CID_EXPOSURE_AUTO: u32 = 0x009a_0901;
const CID_EXPOSURE_ABSOLUTE: u32 = 0x009a_0902;

/// Captures JPEG frames from a V4L2 device.
///
/// The device handle is held for the camera's lifetime; the mmap stream is
/// opened per capture, which sidesteps stale buffered frames between the
/// long idle gaps of the monitoring loop.
pub struct V4l2Camera {
    device: Device,
    path: PathBuf,
    started: bool,
}

impl V4l2Camera {
    pub fn open(path: Option<PathBuf>) -> DetectResult<Self> {
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE));
        let device = Device::with_path(&path).map_err(|err| {
            DetectError::capability_unavailable(
                "camera",
                format!("failed to open {}: {err}", path.display()),
            )
        })?;
        Ok(Self {
            device,
            path,
            started: false,
        })
    }

    fn apply_control(&self, id: u32, value: Value, label: &str) {
        if let Err(err) = self.device.set_control(Control { id, value }) {
            log::warn!(
                "control {label} not applied on {}: {err}",
                self.path.display()
            );
        }
    }

    /// Maps a normalized control value into the driver-reported range.
    fn scaled(&self, id: u32, fraction: f32) -> Option<i64> {
        let descriptions = self.device.query_controls().ok()?;
        let desc = descriptions.into_iter().find(|d| d.id == id)?;
        let fraction = f64::from(fraction.clamp(0.0, 1.0));
        let span = (desc.maximum - desc.minimum) as f64;
        Some(desc.minimum + (span * fraction).round() as i64)
    }
}

impl FrameSource for V4l2Camera {
    fn name(&self) -> &'static str {
        "v4l2"
    }

    fn configure(&mut self, resolution: Resolution, controls: &CameraControls) -> DetectResult<()> {
        let format = Format::new(resolution.width, resolution.height, FourCC::new(b"MJPG"));
        let actual = self
            .device
            .set_format(&format)
            .map_err(|err| DetectError::configuration(format!("failed to set format: {err}")))?;
        if actual.width != resolution.width || actual.height != resolution.height {
            log::warn!(
                "driver negotiated {}x{} instead of {}x{}",
                actual.width,
                actual.height,
                resolution.width,
                resolution.height
            );
        }

        // Normalized ranges: brightness -1..1, contrast/sharpness 0..2.
        if let Some(value) = self.scaled(CID_BRIGHTNESS, (controls.brightness + 1.0) / 2.0) {
            self.apply_control(CID_BRIGHTNESS, Value::Integer(value), "brightness");
        }
        if let Some(value) = self.scaled(CID_CONTRAST, controls.contrast / 2.0) {
            self.apply_control(CID_CONTRAST, Value::Integer(value), "contrast");
        }
        if let Some(value) = self.scaled(CID_SHARPNESS, controls.sharpness / 2.0) {
            self.apply_control(CID_SHARPNESS, Value::Integer(value), "sharpness");
        }
        self.apply_control(
            CID_AUTO_WHITE_BALANCE,
            Value::Boolean(controls.auto_white_balance),
            "auto white balance",
        );
        // V4L2_EXPOSURE_AUTO = 0, V4L2_EXPOSURE_MANUAL = 1.
        let exposure_mode = if controls.auto_exposure { 0 } else { 1 };
        self.apply_control(
            CID_EXPOSURE_AUTO,
            Value::Integer(exposure_mode),
            "auto exposure",
        );
        if let Some(us) = controls.exposure_time_us {
            // EXPOSURE_ABSOLUTE is in 100us units.
            self.apply_control(
                CID_EXPOSURE_ABSOLUTE,
                Value::Integer(i64::from(us / 100)),
                "exposure time",
            );
        }
        if let Some(gain) = controls.analog_gain {
            if let Some(value) = self.scaled(CID_GAIN, gain / 2.0) {
                self.apply_control(CID_GAIN, Value::Integer(value), "analog gain");
            }
        }
        Ok(())
    }

    fn start(&mut self) -> DetectResult<()> {
        self.started = true;
        Ok(())
    }

    fn capture_frame(&mut self) -> DetectResult<RgbImage> {
        if !self.started {
            return Err(DetectError::transient("v4l2 camera is not started"));
        }
        let mut stream =
            v4l::io::mmap::Stream::with_buffers(&self.device, Type::VideoCapture, STREAM_BUFFERS)
                .map_err(|err| {
                    DetectError::transient(format!(
                        "failed to start stream on {}: {err}",
                        self.path.display()
                    ))
                })?;
        for _ in 0..WARMUP_FRAMES {
            stream
                .next()
                .map_err(|err| DetectError::transient(format!("frame dequeue failed: {err}")))?;
        }
        let (data, _meta) = stream
            .next()
            .map_err(|err| DetectError::transient(format!("frame dequeue failed: {err}")))?;
        let image = image::load_from_memory(data)
            .map_err(|err| DetectError::invalid_frame(format!("undecodable MJPG frame: {err}")))?;
        Ok(image.to_rgb8())
    }

    fn stop(&mut self) {
        self.started = false;
    }
}
