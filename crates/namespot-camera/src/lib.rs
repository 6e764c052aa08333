//! Frame source capability: exclusive ownership of one camera-like device.
//!
//! The pipeline acquires a [`FrameSource`] once at startup and holds it for
//! the session; backends are selected through [`Configuration`] the same way
//! regardless of whether frames come from V4L2 hardware, a directory of
//! still images, or the synthetic mock used in tests.

pub mod backends;
mod config;
mod controls;
mod source;

pub use config::{Backend, Configuration};
pub use controls::{CameraControls, Resolution};
pub use source::{DynFrameSource, FrameSource};
