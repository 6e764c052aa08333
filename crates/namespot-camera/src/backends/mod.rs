pub mod mock;
#[cfg(feature = "backend-still")]
pub mod still;
#[cfg(all(feature = "backend-v4l2", target_os = "linux"))]
pub mod v4l2;
