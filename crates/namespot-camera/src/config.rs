use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use namespot_types::{DetectError, DetectResult};

use crate::controls::{CameraControls, Resolution};
use crate::source::DynFrameSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Mock,
    Still,
    V4l2,
}

impl FromStr for Backend {
    type Err = DetectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mock" => Ok(Backend::Mock),
            "still" => Ok(Backend::Still),
            "v4l2" => Ok(Backend::V4l2),
            other => Err(DetectError::configuration(format!(
                "unknown camera backend '{other}'"
            ))),
        }
    }
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Mock => "mock",
            Backend::Still => "still",
            Backend::V4l2 => "v4l2",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn compiled_backends() -> Vec<Backend> {
    let mut backends = Vec::new();
    #[cfg(all(feature = "backend-v4l2", target_os = "linux"))]
    {
        backends.push(Backend::V4l2);
    }
    #[cfg(feature = "backend-still")]
    {
        backends.push(Backend::Still);
    }
    backends.push(Backend::Mock);
    backends
}

#[derive(Debug, Clone)]
pub struct Configuration {
    pub backend: Backend,
    /// V4L2 device node, e.g. `/dev/video0`.
    pub device: Option<PathBuf>,
    /// Source directory for the still-image backend.
    pub still_dir: Option<PathBuf>,
    pub resolution: Resolution,
    pub controls: CameraControls,
}

impl Default for Configuration {
    fn default() -> Self {
        let backend = compiled_backends()
            .into_iter()
            .next()
            .unwrap_or(Backend::Mock);
        Self {
            backend,
            device: None,
            still_dir: None,
            resolution: Resolution::default(),
            controls: CameraControls::default(),
        }
    }
}

impl Configuration {
    pub fn from_env() -> DetectResult<Self> {
        let mut config = Configuration::default();
        if let Ok(backend) = env::var("NAMESPOT_BACKEND") {
            config.backend = Backend::from_str(&backend)?;
        }
        if let Ok(device) = env::var("NAMESPOT_DEVICE") {
            config.device = Some(PathBuf::from(device));
        }
        if let Ok(dir) = env::var("NAMESPOT_STILL_DIR") {
            config.still_dir = Some(PathBuf::from(dir));
        }
        Ok(config)
    }

    pub fn available_backends() -> Vec<Backend> {
        compiled_backends()
    }

    /// Opens the selected backend. An unavailable backend is a startup
    /// failure, never a per-capture one.
    pub fn create_source(&self) -> DetectResult<DynFrameSource> {
        match self.backend {
            Backend::Mock => Ok(Box::new(crate::backends::mock::MockCamera::new(
                self.resolution,
            ))),
            Backend::Still => {
                #[cfg(feature = "backend-still")]
                {
                    let dir = self.still_dir.clone().ok_or_else(|| {
                        DetectError::configuration(
                            "still backend requires a source directory (NAMESPOT_STILL_DIR)",
                        )
                    })?;
                    Ok(Box::new(crate::backends::still::StillCamera::open(dir)?))
                }
                #[cfg(not(feature = "backend-still"))]
                {
                    Err(DetectError::capability_unavailable(
                        "camera",
                        "still backend is not compiled into this build",
                    ))
                }
            }
            Backend::V4l2 => {
                #[cfg(all(feature = "backend-v4l2", target_os = "linux"))]
                {
                    Ok(Box::new(crate::backends::v4l2::V4l2Camera::open(
                        self.device.clone(),
                    )?))
                }
                #[cfg(not(all(feature = "backend-v4l2", target_os = "linux")))]
                {
                    Err(DetectError::capability_unavailable(
                        "camera",
                        "v4l2 backend is not compiled into this build",
                    ))
                }
            }
        }
    }
}
