// Artifact score map.
//
// Diffusion artifacts show up as smeared, low-detail regions. Detail is
// measured per block as the variance of the gradient magnitude; blocks are
// then ranked against the lit blocks of the same image:
//
//     score = 1 - clamp((var - p10) / (p90 - p10), 0, 1)
//
// so the flattest tenth scores 1 and the busiest tenth scores 0. Dark blocks
// (mean gray <= `min_brightness`) are shadows, not artifacts, and score 0.
// Block scores are resampled to pixels, box-blurred for soft transitions and
// pushed through a power curve that keeps clean areas clean.
//
// Degenerate inputs never produce NaN: an image smaller than one block, an
// all-dark image, or one with no spread between p10 and p90 (a flat image)
// yields an all-zero map.

use image::RgbaImage;
use rayon::prelude::*;
use yentyo_diffusion::bilinear_upscale;

use crate::config::PostProcessConfig;

/// Luma (Rec. 601 weights) per pixel, row-major, 0..255 scale.
pub fn grayscale(image: &RgbaImage) -> Vec<f32> {
    image
        .pixels()
        .map(|p| 0.299 * f32::from(p[0]) + 0.587 * f32::from(p[1]) + 0.114 * f32::from(p[2]))
        .collect()
}

/// Central-difference gradient magnitude. Border pixels are 0.
pub fn compute_gradient(gray: &[f32], width: usize, height: usize) -> Vec<f32> {
    let mut mag = vec![0.0f32; width * height];
    if width < 3 || height < 3 || gray.len() < width * height {
        return mag;
    }
    mag.par_chunks_mut(width)
        .enumerate()
        .skip(1)
        .take(height - 2)
        .for_each(|(y, row)| {
            for x in 1..width - 1 {
                let i = y * width + x;
                let gx = gray[i + 1] - gray[i - 1];
                let gy = gray[i + width] - gray[i - width];
                row[x] = (gx * gx + gy * gy).sqrt();
            }
        });
    mag
}

/// In-place separable box blur. The window is clipped at the edges and
/// averaged over the pixels it actually covers.
pub fn box_blur(data: &mut [f32], width: usize, height: usize, radius: usize) {
    if radius == 0 || width == 0 || height == 0 || data.len() < width * height {
        return;
    }
    let data = &mut data[..width * height];

    let mut tmp = vec![0.0f32; width * height];
    tmp.par_chunks_mut(width)
        .zip(data.par_chunks(width))
        .for_each(|(out, row)| {
            for (x, o) in out.iter_mut().enumerate() {
                let lo = x.saturating_sub(radius);
                let hi = (x + radius).min(width - 1);
                *o = row[lo..=hi].iter().sum::<f32>() / (hi - lo + 1) as f32;
            }
        });

    data.par_chunks_mut(width).enumerate().for_each(|(y, out)| {
        let lo = y.saturating_sub(radius);
        let hi = (y + radius).min(height - 1);
        let n = (hi - lo + 1) as f32;
        for (x, o) in out.iter_mut().enumerate() {
            *o = (lo..=hi).map(|yy| tmp[yy * width + x]).sum::<f32>() / n;
        }
    });
}

/// `p`-th percentile (0..=100) with linear interpolation between order
/// statistics. Empty input gives 0.
pub fn percentile(data: &[f32], p: f32) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(f32::total_cmp);
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = rank - lo as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Per-block (gradient variance, mean gray), row-major over blocks.
fn block_stats(
    gray: &[f32],
    grad: &[f32],
    width: usize,
    block: usize,
    blocks_w: usize,
    blocks_h: usize,
) -> Vec<(f32, f32)> {
    (0..blocks_w * blocks_h)
        .into_par_iter()
        .map(|b| {
            let (bx, by) = (b % blocks_w, b / blocks_w);
            let n = (block * block) as f32;
            let (mut sum, mut sum_sq, mut bright) = (0.0f32, 0.0f32, 0.0f32);
            for y in by * block..(by + 1) * block {
                for x in bx * block..(bx + 1) * block {
                    let i = y * width + x;
                    sum += grad[i];
                    sum_sq += grad[i] * grad[i];
                    bright += gray[i];
                }
            }
            let mean = sum / n;
            ((sum_sq / n - mean * mean).max(0.0), bright / n)
        })
        .collect()
}

/// Pixel-level artifact score in [0, 1], row-major, same size as `image`.
pub fn compute_artifact_score(image: &RgbaImage, config: &PostProcessConfig) -> Vec<f32> {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let zeros = vec![0.0f32; w * h];
    let block = config.block_size as usize;
    if block == 0 {
        return zeros;
    }
    let (blocks_w, blocks_h) = (w / block, h / block);
    if blocks_w == 0 || blocks_h == 0 {
        return zeros;
    }

    let gray = grayscale(image);
    let grad = compute_gradient(&gray, w, h);
    let stats = block_stats(&gray, &grad, w, block, blocks_w, blocks_h);

    let lit: Vec<f32> = stats
        .iter()
        .filter(|(_, bright)| *bright > config.min_brightness)
        .map(|(var, _)| *var)
        .collect();
    if lit.is_empty() {
        return zeros;
    }
    let (p10, p90) = (percentile(&lit, 10.0), percentile(&lit, 90.0));
    if p90 <= p10 {
        return zeros;
    }

    let block_scores: Vec<f32> = stats
        .iter()
        .map(|&(var, bright)| {
            if bright > config.min_brightness {
                1.0 - ((var - p10) / (p90 - p10)).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect();

    let mut score = bilinear_upscale(&block_scores, blocks_w, blocks_h, w, h);
    box_blur(&mut score, w, h, config.score_blur_radius);
    for s in &mut score {
        let v = s.clamp(0.0, 1.0).powf(config.score_power);
        *s = if v.is_finite() { v } else { 0.0 };
    }
    score
}

/// Summary of a score map, for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArtifactStats {
    pub mean: f32,
    /// Fraction of pixels scoring above 0.5.
    pub high_fraction: f32,
}

pub fn summarize(score: &[f32]) -> ArtifactStats {
    if score.is_empty() {
        return ArtifactStats::default();
    }
    let n = score.len() as f32;
    ArtifactStats {
        mean: score.iter().sum::<f32>() / n,
        high_fraction: score.iter().filter(|&&s| s > 0.5).count() as f32 / n,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use image::Rgba;
    use yentyo_prng::YentRng;

    use super::*;

    pub(crate) fn noise_image(w: u32, h: u32, seed: u64) -> RgbaImage {
        let mut rng = YentRng::new(seed);
        RgbaImage::from_fn(w, h, |_, _| {
            let mut byte = || rng.range_u64(0, 256) as u8;
            Rgba([byte(), byte(), byte(), 255])
        })
    }

    #[test]
    fn gradient_of_horizontal_ramp() {
        let gray: Vec<f32> = (0..100).map(|i| (i % 10) as f32 * 25.5).collect();
        let mag = compute_gradient(&gray, 10, 10);
        assert!((mag[5 * 10 + 5] - 51.0).abs() < 1e-3);
        assert_eq!(mag[0], 0.0);
        assert_eq!(mag[9 * 10 + 5], 0.0);
        assert_eq!(mag[5 * 10 + 9], 0.0);
    }

    #[test]
    fn blur_spreads_a_spike() {
        let mut data = vec![0.0f32; 100];
        data[55] = 1.0;
        box_blur(&mut data, 10, 10, 2);
        assert!(data[55] < 1.0);
        assert!(data[54] > 0.0);
        let total: f32 = data.iter().sum();
        assert!(total > 0.5 && total <= 1.0 + 1e-5);
    }

    #[test]
    fn blur_keeps_constant_field() {
        let mut data = vec![0.7f32; 12 * 7];
        box_blur(&mut data, 12, 7, 3);
        assert!(data.iter().all(|&v| (v - 0.7).abs() < 1e-5));
    }

    #[test]
    fn percentile_interpolates() {
        let data: Vec<f32> = (1..=10).map(|v| v as f32).collect();
        assert_eq!(percentile(&data, 0.0), 1.0);
        assert_eq!(percentile(&data, 100.0), 10.0);
        assert!((percentile(&data, 50.0) - 5.5).abs() < 1e-6);
        // Order does not matter.
        let shuffled = [7.0, 1.0, 10.0, 3.0, 2.0, 9.0, 5.0, 4.0, 8.0, 6.0];
        assert_eq!(percentile(&shuffled, 0.0), 1.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn noise_image_scores_in_unit_range() {
        let img = noise_image(96, 96, 42);
        let score = compute_artifact_score(&img, &PostProcessConfig::default());
        assert_eq!(score.len(), 96 * 96);
        assert!(score.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn flat_image_scores_zero() {
        let img = RgbaImage::from_pixel(96, 96, Rgba([128, 128, 128, 255]));
        let score = compute_artifact_score(&img, &PostProcessConfig::default());
        assert_eq!(score.len(), 96 * 96);
        assert!(score.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn dark_image_scores_zero() {
        let mut img = noise_image(48, 48, 3);
        for p in img.pixels_mut() {
            for c in 0..3 {
                p[c] /= 16;
            }
        }
        let score = compute_artifact_score(&img, &PostProcessConfig::default());
        assert!(score.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn smooth_half_scores_higher_than_noisy_half() {
        // Left half noise, right half flat mid-gray.
        let noise = noise_image(96, 96, 9);
        let img = RgbaImage::from_fn(96, 96, |x, y| {
            if x < 48 { *noise.get_pixel(x, y) } else { Rgba([140, 140, 140, 255]) }
        });
        let config = PostProcessConfig {
            score_blur_radius: 2,
            ..Default::default()
        };
        let score = compute_artifact_score(&img, &config);
        let mean = |x0: usize, x1: usize| {
            let mut sum = 0.0;
            for y in 0..96 {
                for x in x0..x1 {
                    sum += score[y * 96 + x];
                }
            }
            sum / ((x1 - x0) * 96) as f32
        };
        assert!(mean(72, 96) > mean(0, 24), "smooth side should score higher");
    }

    #[test]
    fn tiny_image_is_all_zero() {
        let img = noise_image(8, 8, 1);
        assert_eq!(compute_artifact_score(&img, &PostProcessConfig::default()), vec![0.0; 64]);
    }

    #[test]
    fn summary_counts_high_pixels() {
        let stats = summarize(&[0.0, 1.0, 0.6, 0.2]);
        assert!((stats.mean - 0.45).abs() < 1e-6);
        assert_eq!(stats.high_fraction, 0.5);
        assert_eq!(summarize(&[]), ArtifactStats::default());
    }
}
