// Full post-processing pass.
//
// Order of operations on a working copy of the input:
// 1. artifact score map from the untouched source,
// 2. first grain pass (score-modulated),
// 3. ASCII overlay rendered from the source at 1/`overlay_downscale`
//    resolution, scaled back up and blended by score,
// 4. chromatic aberration (score-modulated),
// 5. vignette,
// 6. finishing grain pass at reduced intensity, unmodulated, to bind the
//    layers together.
//
// The caller's image is only ever borrowed immutably.

use std::time::Instant;

use image::RgbaImage;
use tracing::debug;
use yentyo_diffusion::{ResizeFilter, resize_rgba};

use crate::ascii::{blend_overlay, render_ascii_layer};
use crate::config::{PostProcessConfig, PostProcessError};
use crate::effects::{apply_chromatic_aberration, apply_film_grain, apply_vignette};
use crate::score::{compute_artifact_score, summarize};

#[derive(Clone, Debug, Default)]
pub struct PostProcessor {
    config: PostProcessConfig,
}

impl PostProcessor {
    pub fn new(config: PostProcessConfig) -> Result<Self, PostProcessError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PostProcessConfig {
        &self.config
    }

    /// Stylize `image`, writing `words` into its artifact zones.
    pub fn run(&self, image: &RgbaImage, words: &str) -> RgbaImage {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return image.clone();
        }
        let start = Instant::now();
        let cfg = &self.config;

        let score = compute_artifact_score(image, cfg);
        let stats = summarize(&score);

        let mut out = image.clone();
        apply_film_grain(&mut out, cfg.grain_intensity, cfg.grain_seed, Some(&score));

        let ds = cfg.overlay_downscale.max(1);
        let layer = render_ascii_layer(image, words, &score, (w / ds).max(1), (h / ds).max(1), cfg);
        let layer = resize_rgba(&layer, w, h, ResizeFilter::Bilinear);
        blend_overlay(&mut out, &layer, &score, cfg);

        apply_chromatic_aberration(&mut out, cfg.aberration_offset, Some(&score));
        apply_vignette(&mut out, cfg.vignette_strength);
        apply_film_grain(
            &mut out,
            cfg.grain_intensity * cfg.second_grain_scale,
            cfg.second_grain_seed,
            None,
        );

        debug!(
            width = w,
            height = h,
            mean_score = stats.mean,
            high_artifact = stats.high_fraction,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "post-processed"
        );
        out
    }
}

/// `PostProcessor::run` with default settings.
pub fn post_process(image: &RgbaImage, words: &str) -> RgbaImage {
    PostProcessor::default().run(image, words)
}
