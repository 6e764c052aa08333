/// Capture resolution requested from the frame source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// Imaging controls applied before the first capture.
///
/// `brightness` uses the -1.0..1.0 range, `contrast` and `sharpness` use
/// 0.0..2.0 with 1.0 meaning "unchanged"; backends map these onto whatever
/// integer ranges the driver exposes. Optional fields are left at the
/// driver default when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraControls {
    pub brightness: f32,
    pub contrast: f32,
    pub sharpness: f32,
    pub exposure_time_us: Option<u32>,
    pub analog_gain: Option<f32>,
    pub auto_white_balance: bool,
    pub auto_exposure: bool,
}

impl Default for CameraControls {
    fn default() -> Self {
        Self {
            brightness: 0.1,
            contrast: 1.2,
            sharpness: 1.0,
            exposure_time_us: None,
            analog_gain: None,
            auto_white_balance: true,
            auto_exposure: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_still_capture_profile() {
        let controls = CameraControls::default();
        assert_eq!(controls.brightness, 0.1);
        assert_eq!(controls.contrast, 1.2);
        assert_eq!(controls.sharpness, 1.0);
        assert!(controls.auto_exposure);
        assert_eq!(Resolution::default(), Resolution::new(1920, 1080));
    }
}
