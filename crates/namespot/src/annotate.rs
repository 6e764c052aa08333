//! Evidence-image rendering: token boxes plus a name summary panel.
//!
//! Purely additive reporting side channel. The original frame is never
//! mutated and nothing rendered here feeds back into extraction.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use namespot_types::RecognizedToken;
use once_cell::sync::Lazy;

/// Tokens at or below this confidence are left unboxed.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 60.0;

const BOX_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const PANEL_COLOR: Rgb<u8> = Rgb([20, 20, 30]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const PANEL_WIDTH: u32 = 420;
const PANEL_HEADER_HEIGHT: u32 = 40;
const PANEL_LINE_HEIGHT: u32 = 24;
const PANEL_PADDING: u32 = 12;
const TEXT_SCALE: f32 = 18.0;

static PANEL_FONT: Lazy<Option<FontVec>> = Lazy::new(load_panel_font);

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

fn load_panel_font() -> Option<FontVec> {
    let mut candidates: Vec<String> = Vec::new();
    if let Ok(path) = std::env::var("NAMESPOT_FONT") {
        candidates.push(path);
    }
    candidates.extend(FONT_CANDIDATES.iter().map(|s| s.to_string()));
    for path in candidates {
        if let Ok(bytes) = std::fs::read(&path) {
            match FontVec::try_from_vec(bytes) {
                Ok(font) => {
                    log::debug!("panel font loaded from {path}");
                    return Some(font);
                }
                Err(err) => log::warn!("unusable font {path}: {err}"),
            }
        }
    }
    log::warn!("no usable panel font found; annotations will omit text labels");
    None
}

/// Draws recognized-token boxes and the name summary onto a copy of the
/// original frame. Tokens with confidence above `min_confidence` get a
/// bounding box and an index label; the panel is blended at 50% opacity
/// with its height proportional to the name count.
pub fn render_annotated(
    frame: &RgbImage,
    names: &[String],
    tokens: &[RecognizedToken],
    min_confidence: f32,
) -> RgbImage {
    let mut canvas = frame.clone();
    let font = PANEL_FONT.as_ref();

    for (index, token) in tokens
        .iter()
        .filter(|t| t.confidence > min_confidence)
        .enumerate()
    {
        draw_token_box(&mut canvas, token, index + 1, font);
    }

    blend_panel(&mut canvas, names.len() as u32);

    if let Some(font) = font {
        let header = format!("Detected {} name(s)", names.len());
        draw_text_mut(
            &mut canvas,
            TEXT_COLOR,
            PANEL_PADDING as i32,
            PANEL_PADDING as i32,
            PxScale::from(TEXT_SCALE),
            font,
            &header,
        );
        for (index, name) in names.iter().enumerate() {
            let y = PANEL_HEADER_HEIGHT + index as u32 * PANEL_LINE_HEIGHT;
            draw_text_mut(
                &mut canvas,
                TEXT_COLOR,
                PANEL_PADDING as i32,
                y as i32,
                PxScale::from(TEXT_SCALE),
                font,
                &format!("{}. {}", index + 1, name),
            );
        }
    }

    canvas
}

fn draw_token_box(canvas: &mut RgbImage, token: &RecognizedToken, index: usize, font: Option<&FontVec>) {
    let width = token.bounds.width.max(1);
    let height = token.bounds.height.max(1);
    let rect = Rect::at(token.bounds.x, token.bounds.y).of_size(width, height);
    draw_hollow_rect_mut(canvas, rect, BOX_COLOR);
    if let Some(font) = font {
        let label_y = (token.bounds.y - TEXT_SCALE as i32).max(0);
        draw_text_mut(
            canvas,
            BOX_COLOR,
            token.bounds.x.max(0),
            label_y,
            PxScale::from(TEXT_SCALE),
            font,
            &index.to_string(),
        );
    }
}

/// Height grows with the name count; width is fixed, anchored top-left.
fn panel_size(canvas: &RgbImage, name_count: u32) -> (u32, u32) {
    let width = PANEL_WIDTH.min(canvas.width());
    let height =
        (PANEL_HEADER_HEIGHT + name_count * PANEL_LINE_HEIGHT + PANEL_PADDING).min(canvas.height());
    (width, height)
}

fn blend_panel(canvas: &mut RgbImage, name_count: u32) {
    let (panel_w, panel_h) = panel_size(canvas, name_count);
    for y in 0..panel_h {
        for x in 0..panel_w {
            let pixel = canvas.get_pixel_mut(x, y);
            for (channel, panel_channel) in pixel.0.iter_mut().zip(PANEL_COLOR.0) {
                // 50% opacity blend.
                *channel = ((u16::from(*channel) + u16::from(panel_channel)) / 2) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use namespot_types::TokenBox;

    fn frame() -> RgbImage {
        RgbImage::from_pixel(640, 480, Rgb([200, 200, 200]))
    }

    fn token(confidence: f32) -> RecognizedToken {
        RecognizedToken::new("Smith", TokenBox::new(500, 300, 60, 20), confidence)
    }

    #[test]
    fn original_frame_is_untouched() {
        let original = frame();
        let before = original.clone();
        let _ = render_annotated(
            &original,
            &["John Doe".to_string()],
            &[token(95.0)],
            DEFAULT_MIN_CONFIDENCE,
        );
        assert_eq!(original.as_raw(), before.as_raw());
    }

    #[test]
    fn panel_region_is_darkened() {
        let annotated = render_annotated(&frame(), &["John Doe".to_string()], &[], 60.0);
        // Inside the panel the light background is blended toward the
        // panel color; outside it is unchanged.
        assert!(annotated.get_pixel(5, 5).0[0] < 200);
        assert_eq!(annotated.get_pixel(639, 479).0[0], 200);
    }

    #[test]
    fn low_confidence_tokens_are_not_boxed() {
        let annotated = render_annotated(&frame(), &["John Doe".to_string()], &[token(30.0)], 60.0);
        // Top-left corner of where the box would have been.
        assert_eq!(annotated.get_pixel(500, 300).0, [200, 200, 200]);
    }

    #[test]
    fn confident_tokens_are_boxed() {
        let annotated = render_annotated(&frame(), &["John Doe".to_string()], &[token(95.0)], 60.0);
        assert_eq!(annotated.get_pixel(500, 300).0, BOX_COLOR.0);
    }

    #[test]
    fn panel_height_grows_with_name_count() {
        let canvas = frame();
        let (_, one) = panel_size(&canvas, 1);
        let (_, five) = panel_size(&canvas, 5);
        assert_eq!(five - one, 4 * PANEL_LINE_HEIGHT);
    }
}
