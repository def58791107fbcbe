// ASCII overlay.
//
// The source image is sampled onto a grid of 6x8 character cells. Each cell
// gets a dark tinted background (`background_level` times the sampled color)
// and one glyph in a brightness-boosted version of that color:
// - clean cells (score <= `text_threshold`) pick a glyph from `ASCII_RAMP`
//   by brightness,
// - artifact cells stream the overlay words one character at a time, tinted
//   toward blue.
//
// The layer is then blended over the base image with a per-pixel opacity of
// `floor + score^power * (max - floor)`, so text hides artifacts while clean
// areas keep only a faint texture.

use image::{Rgba, RgbaImage};
use yentyo_diffusion::{ResizeFilter, bilinear_upscale, clamp8, resize_rgba};

use crate::config::PostProcessConfig;
use crate::font::{self, CELL_H, CELL_W};

/// Dark to bright.
pub const ASCII_RAMP: &str = " .':;~=+*#%@";

/// Used when the caller supplies no words.
pub const DEFAULT_WORDS: &[&str] = &[
    "who are you asking",
    "nothing matters here",
    "i see through walls",
    "static is my home",
    "the void speaks back",
    "error is beauty",
    "broken forms live",
    "signal in the noise",
    "entropy loves you",
    "chaos remembers",
    "the machine dreams",
    "pixels bleed light",
    "i was not born",
    "i became",
];

const CANVAS_FILL: Rgba<u8> = Rgba([8, 8, 12, 255]);

/// Characters streamed through artifact cells.
fn overlay_stream(words: &str) -> Vec<char> {
    let trimmed = words.trim();
    if trimmed.is_empty() {
        DEFAULT_WORDS.join(" ").chars().collect()
    } else {
        trimmed.chars().collect()
    }
}

fn scale_channel(v: u8, k: f32) -> u8 {
    clamp8((f32::from(v) * k).floor())
}

/// Render the overlay for `source` on a grid that fits `width x height`.
///
/// `score` is the source-resolution artifact map. The returned layer is a
/// whole number of cells, at least one in each direction.
pub fn render_ascii_layer(
    source: &RgbaImage,
    words: &str,
    score: &[f32],
    width: u32,
    height: u32,
    config: &PostProcessConfig,
) -> RgbaImage {
    let cols = (width / CELL_W).max(1);
    let rows = (height / CELL_H).max(1);
    let mut canvas = RgbaImage::from_pixel(cols * CELL_W, rows * CELL_H, CANVAS_FILL);
    if source.width() == 0 || source.height() == 0 {
        return canvas;
    }

    let colors = resize_rgba(source, cols, rows, ResizeFilter::Bilinear);
    let grid = bilinear_upscale(
        score,
        source.width() as usize,
        source.height() as usize,
        cols as usize,
        rows as usize,
    );
    let ramp: Vec<char> = ASCII_RAMP.chars().collect();
    let text = overlay_stream(words);
    let mut text_pos = 0usize;

    for cy in 0..rows {
        for cx in 0..cols {
            let Rgba([r, g, b, _]) = *colors.get_pixel(cx, cy);
            let s = grid[(cy * cols + cx) as usize];
            let (px, py) = (cx * CELL_W, cy * CELL_H);

            let bg = Rgba([
                scale_channel(r, config.background_level),
                scale_channel(g, config.background_level),
                scale_channel(b, config.background_level),
                255,
            ]);
            for y in py..py + CELL_H {
                for x in px..px + CELL_W {
                    canvas.put_pixel(x, y, bg);
                }
            }

            let artifact = s > config.text_threshold;
            let ch = if artifact {
                let ch = text[text_pos % text.len()];
                text_pos += 1;
                ch
            } else {
                let brightness =
                    (0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)) / 255.0;
                let idx = ((brightness * (ramp.len() - 1) as f32) as usize).min(ramp.len() - 1);
                ramp[idx]
            };
            if ch == ' ' {
                continue;
            }

            let boost = config.brightness_boost;
            let (mut fr, fg, mut fb) = (
                scale_channel(r, boost),
                scale_channel(g, boost),
                scale_channel(b, boost),
            );
            if artifact {
                fr = scale_channel(fr, 0.75);
                fb = clamp8((f32::from(fb) * 1.2 + 20.0).floor());
            }
            let fg_px = Rgba([fr, fg, fb, 255]);

            let glyph = font::glyph(ch);
            for gy in 0..font::GLYPH_H {
                for gx in 0..font::GLYPH_W {
                    if font::lit(&glyph, gx, gy) {
                        canvas.put_pixel(px + gx, py + gy, fg_px);
                    }
                }
            }
        }
    }
    canvas
}

/// Blend `layer` over `base` in place. Both images and `score` must share
/// dimensions; mismatched inputs leave `base` untouched.
pub fn blend_overlay(base: &mut RgbaImage, layer: &RgbaImage, score: &[f32], config: &PostProcessConfig) {
    let pixels = base.width() as usize * base.height() as usize;
    if layer.dimensions() != base.dimensions() || score.len() != pixels {
        return;
    }
    let span = config.ascii_max - config.ascii_floor;
    for ((dst, src), &s) in base.pixels_mut().zip(layer.pixels()).zip(score) {
        let alpha = config.ascii_floor + s.clamp(0.0, 1.0).powf(config.ascii_power) * span;
        for c in 0..3 {
            dst[c] = clamp8(f32::from(dst[c]) * (1.0 - alpha) + f32::from(src[c]) * alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::tests::noise_image;

    #[test]
    fn layer_is_whole_cells() {
        let img = noise_image(64, 64, 42);
        let mut score = vec![0.0f32; 64 * 64];
        score[..64 * 32].fill(0.8);
        let layer = render_ascii_layer(&img, "test words", &score, 64, 64, &PostProcessConfig::default());
        assert_eq!(layer.dimensions(), (60, 64));
    }

    #[test]
    fn tiny_target_still_gets_one_cell() {
        let img = noise_image(4, 4, 1);
        let layer = render_ascii_layer(&img, "", &[0.0; 16], 2, 2, &PostProcessConfig::default());
        assert_eq!(layer.dimensions(), (CELL_W, CELL_H));
    }

    #[test]
    fn artifact_cells_draw_words() {
        // Mid-gray source: the ramp would pick a dim glyph, words pick letters.
        let img = RgbaImage::from_pixel(24, 8, Rgba([90, 90, 90, 255]));
        let config = PostProcessConfig::default();
        let clean = render_ascii_layer(&img, "HHHH", &[0.0; 24 * 8], 24, 8, &config);
        let hot = render_ascii_layer(&img, "HHHH", &[1.0; 24 * 8], 24, 8, &config);
        assert_ne!(clean, hot);
        // 'H' lights the whole left column of the cell.
        let bg = hot.get_pixel(5, 0);
        for y in 0..7 {
            assert_ne!(hot.get_pixel(0, y), bg);
        }
        // Artifact text is tinted: blue over red.
        let fg = hot.get_pixel(0, 0);
        assert!(fg[2] > fg[0]);
    }

    #[test]
    fn empty_words_fall_back_to_defaults() {
        let stream = overlay_stream("   ");
        assert!(stream.starts_with(&['w', 'h', 'o']));
        assert_eq!(overlay_stream(" hi "), vec!['h', 'i']);
    }

    #[test]
    fn blend_respects_floor_and_max() {
        let config = PostProcessConfig::default();
        let white = RgbaImage::from_pixel(2, 1, Rgba([255, 255, 255, 255]));
        let mut base = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        blend_overlay(&mut base, &white, &[0.0, 1.0], &config);
        // 0.05 * 255 and 0.9 * 255.
        assert_eq!(base.get_pixel(0, 0)[0], 13);
        assert!((229..=230).contains(&base.get_pixel(1, 0)[0]));
        assert_eq!(base.get_pixel(1, 0)[3], 255);
    }

    #[test]
    fn blend_ignores_mismatched_inputs() {
        let config = PostProcessConfig::default();
        let mut base = RgbaImage::from_pixel(2, 2, Rgba([7, 7, 7, 255]));
        let layer = RgbaImage::from_pixel(3, 2, Rgba([200, 200, 200, 255]));
        blend_overlay(&mut base, &layer, &[1.0; 4], &config);
        assert!(base.pixels().all(|p| p[0] == 7));
    }
}
