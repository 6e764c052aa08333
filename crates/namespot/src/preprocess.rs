//! Frame normalization ahead of text recognition.

use image::{GrayImage, RgbImage};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;
use namespot_types::{DetectError, DetectResult};

/// Radius of the structuring element used by the closing pass. 1 yields the
/// smallest symmetric kernel imageproc expresses (3x3), enough to merge
/// broken glyph strokes without fusing adjacent characters.
pub const DEFAULT_CLOSING_RADIUS: u8 = 1;

/// Turns a color frame into a single-channel binary image for OCR.
///
/// Grayscale, then a global Otsu threshold (ambient lighting varies between
/// captures, so a fixed cutoff would drift), then one morphological closing
/// pass. The threshold is inverted so dark print becomes foreground, which
/// is what the closing pass needs to merge broken glyph strokes.
/// Deterministic for identical input.
pub fn prepare_for_ocr(frame: &RgbImage, closing_radius: u8) -> DetectResult<GrayImage> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(DetectError::invalid_frame(format!(
            "cannot preprocess a {}x{} frame",
            frame.width(),
            frame.height()
        )));
    }
    let gray = image::imageops::grayscale(frame);
    let level = otsu_level(&gray);
    let binary = threshold(&gray, level, ThresholdType::BinaryInverted);
    if closing_radius == 0 {
        return Ok(binary);
    }
    Ok(close(&binary, Norm::LInf, closing_radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient_frame(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, _y| {
            let level = (x * 255 / width.max(1)) as u8;
            Rgb([level, level, level])
        })
    }

    #[test]
    fn output_is_two_level_regardless_of_lighting() {
        for frame in [
            gradient_frame(64, 48),
            RgbImage::from_fn(64, 48, |x, y| {
                // Uneven lighting: bright corner, dark corner.
                let level = ((x + y) * 2).min(255) as u8;
                Rgb([level, level / 2, level])
            }),
        ] {
            let binary = prepare_for_ocr(&frame, DEFAULT_CLOSING_RADIUS).unwrap();
            assert!(binary.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        }
    }

    #[test]
    fn preprocessing_is_deterministic() {
        let frame = gradient_frame(80, 60);
        let a = prepare_for_ocr(&frame, DEFAULT_CLOSING_RADIUS).unwrap();
        let b = prepare_for_ocr(&frame, DEFAULT_CLOSING_RADIUS).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn zero_sized_frame_is_invalid() {
        let frame = RgbImage::new(0, 0);
        assert!(matches!(
            prepare_for_ocr(&frame, DEFAULT_CLOSING_RADIUS),
            Err(DetectError::InvalidFrame { .. })
        ));
    }

    #[test]
    fn dark_print_becomes_foreground() {
        let frame = RgbImage::from_fn(16, 16, |x, _y| {
            if x < 8 { Rgb([10, 10, 10]) } else { Rgb([240, 240, 240]) }
        });
        let binary = prepare_for_ocr(&frame, 0).unwrap();
        assert_eq!(binary.get_pixel(0, 0).0[0], 255);
        assert_eq!(binary.get_pixel(15, 0).0[0], 0);
    }

    #[test]
    fn closing_bridges_a_broken_stroke() {
        // Two dark segments with a one-pixel gap at (4, 4).
        let frame = RgbImage::from_fn(9, 9, |x, y| {
            if y == 4 && (x == 2 || x == 3 || x == 5 || x == 6) {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let without_closing = prepare_for_ocr(&frame, 0).unwrap();
        let with_closing = prepare_for_ocr(&frame, 1).unwrap();
        assert_eq!(without_closing.get_pixel(4, 4).0[0], 0);
        assert_eq!(with_closing.get_pixel(4, 4).0[0], 255);
    }
}
