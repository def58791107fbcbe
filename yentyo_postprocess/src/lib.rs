// yentyo_postprocess — disguises diffusion artifacts as intentional style.
//
// A raw synthesized image is scored for low-detail "smeared" regions, then
// stylized with passes whose strength follows that score: film grain,
// red/blue channel split, vignette, and an ASCII overlay that writes the
// artist's own words over the worst artifacts.
//
// Module overview:
// - `score.rs`:     grayscale, gradient magnitude, box blur, percentile, and
//                   the block-variance artifact score map.
// - `effects.rs`:   film grain, chromatic aberration, vignette.
// - `font.rs`:      embedded 5x7 bitmap font.
// - `ascii.rs`:     ASCII overlay rendering and score-weighted blending.
// - `processor.rs`: `PostProcessor`, the ordered full pass.
// - `config.rs`:    `PostProcessConfig` and `PostProcessError`.
//
// Every pass is deterministic: grain draws from `yentyo_prng::YentRng`
// seeded from the config, so equal inputs give byte-identical output.

pub mod ascii;
pub mod config;
pub mod effects;
pub mod font;
pub mod processor;
pub mod score;

pub use config::{PostProcessConfig, PostProcessError};
pub use processor::{PostProcessor, post_process};
pub use score::{ArtifactStats, compute_artifact_score};
