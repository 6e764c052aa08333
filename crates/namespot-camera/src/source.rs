use image::RgbImage;
use namespot_types::DetectResult;

use crate::controls::{CameraControls, Resolution};

pub type DynFrameSource = Box<dyn FrameSource>;

/// Common interface for all frame-producing backends.
///
/// A source is an exclusively owned, stateful resource: `configure` before
/// `start`, capture only between `start` and `stop`. The device handle is
/// released when the source is dropped, on every exit path.
pub trait FrameSource: Send {
    fn name(&self) -> &'static str;

    fn configure(&mut self, resolution: Resolution, controls: &CameraControls) -> DetectResult<()>;

    fn start(&mut self) -> DetectResult<()>;

    /// Captures one frame. Decode failures are `InvalidFrame`; device-level
    /// failures (busy, disconnected mid-capture) are `TransientCapture`.
    fn capture_frame(&mut self) -> DetectResult<RgbImage>;

    fn stop(&mut self);
}
