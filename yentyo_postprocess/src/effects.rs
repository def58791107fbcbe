// Score-modulated stylization passes.
//
// Each pass mutates the image it is given; `processor.rs` hands them a
// working copy, never the caller's image. An optional score map (row-major,
// one value per pixel) scales the effect locally so artifact zones get the
// heaviest disguise. A map of the wrong length is ignored.
//
// The vignette is the exception: it takes no score map and darkens the whole
// frame radially, after the masked passes have run.

use image::RgbaImage;
use rayon::prelude::*;
use yentyo_diffusion::clamp8;
use yentyo_prng::YentRng;

/// One standard-normal sample.
pub fn gauss_noise(rng: &mut YentRng) -> f32 {
    rng.next_gaussian() as f32
}

fn mask_for(mask: Option<&[f32]>, pixels: usize) -> Option<&[f32]> {
    mask.filter(|m| m.len() == pixels)
}

/// Additive Gaussian grain with shadow bias. Same seed and same image give
/// byte-identical output.
///
/// Noise is scaled by `1 - 0.4 * luminance` so shadows get more grain. With
/// a score map, strength ranges from half (score 0) to full (score 1).
pub fn apply_film_grain(image: &mut RgbaImage, intensity: f32, seed: u64, mask: Option<&[f32]>) {
    let pixels = image.width() as usize * image.height() as usize;
    let mask = mask_for(mask, pixels);
    let mut rng = YentRng::new(seed);

    for (i, px) in image.pixels_mut().enumerate() {
        let [r, g, b, _] = px.0.map(f32::from);
        let luminance = (0.299 * r + 0.587 * g + 0.114 * b) / 255.0;
        let shadow = 1.0 - luminance * 0.4;
        let local = mask.map_or(1.0, |m| 0.5 + 0.5 * m[i]);
        let scale = intensity * shadow * local;
        for c in 0..3 {
            let noise = gauss_noise(&mut rng) * scale;
            px[c] = clamp8(f32::from(px[c]) + noise);
        }
    }
}

/// Shift red right and blue left by `offset` pixels, clamped at the edges.
/// Green and alpha are untouched. With a score map the shifted channels are
/// blended in by the local score.
pub fn apply_chromatic_aberration(image: &mut RgbaImage, offset: u32, mask: Option<&[f32]>) {
    let (w, h) = image.dimensions();
    if offset == 0 || w == 0 {
        return;
    }
    let mask = mask_for(mask, w as usize * h as usize);
    let source = image.clone();

    for y in 0..h {
        for x in 0..w {
            let red = source.get_pixel(x.saturating_sub(offset), y)[0];
            let blue = source.get_pixel((x + offset).min(w - 1), y)[2];
            let px = image.get_pixel_mut(x, y);
            match mask {
                Some(m) => {
                    let s = m[(y * w + x) as usize];
                    let mix = |orig: u8, shifted: u8| {
                        clamp8(f32::from(orig) + (f32::from(shifted) - f32::from(orig)) * s)
                    };
                    px[0] = mix(px[0], red);
                    px[2] = mix(px[2], blue);
                }
                None => {
                    px[0] = red;
                    px[2] = blue;
                }
            }
        }
    }
}

/// Radial darkening: `1 - strength * (d / d_max)^2` from the image center.
/// Global; depends only on pixel position.
pub fn apply_vignette(image: &mut RgbaImage, strength: f32) {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let (cx, cy) = ((w as f32 - 1.0) / 2.0, (h as f32 - 1.0) / 2.0);
    let max_sq = cx * cx + cy * cy;
    let row_len = w as usize * 4;

    image.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
        let dy = y as f32 - cy;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let dx = x as f32 - cx;
            let falloff = if max_sq > 0.0 {
                (dx * dx + dy * dy) / max_sq
            } else {
                0.0
            };
            let factor = 1.0 - strength * falloff;
            for c in &mut px[..3] {
                *c = clamp8(f32::from(*c) * factor);
            }
        }
    });
}
