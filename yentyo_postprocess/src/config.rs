// Post-processing tunables.
//
// Defaults give the stock look: 12 px scoring blocks, two grain
// passes (seed 42 at full strength, seed 137 at half), a 2 px red/blue
// split, a 0.35 vignette and an ASCII overlay rendered at half resolution.
// `#[serde(default)]` lets a JSON file override any subset.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostProcessError {
    #[error("invalid post-process configuration: {0}")]
    Config(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessConfig {
    /// Side of the square blocks whose gradient variance is scored.
    pub block_size: u32,
    /// Blocks with mean gray level at or below this are shadows, score 0.
    pub min_brightness: f32,
    /// Box-blur radius applied to the pixel-level score map.
    pub score_blur_radius: usize,
    /// Exponent applied to the blurred score map.
    pub score_power: f32,

    pub grain_intensity: f32,
    pub grain_seed: u64,
    pub second_grain_seed: u64,
    /// Intensity of the finishing grain pass relative to the first.
    pub second_grain_scale: f32,

    pub aberration_offset: u32,
    pub vignette_strength: f32,

    /// Overlay opacity where the score is 0.
    pub ascii_floor: f32,
    /// Overlay opacity where the score is 1.
    pub ascii_max: f32,
    pub ascii_power: f32,
    /// Cells scoring above this show overlay words instead of the ramp.
    pub text_threshold: f32,
    /// Cell background as a fraction of the sampled color.
    pub background_level: f32,
    pub brightness_boost: f32,
    /// The overlay is drawn at 1/n resolution and scaled back up.
    pub overlay_downscale: u32,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            block_size: 12,
            min_brightness: 25.0,
            score_blur_radius: 12,
            score_power: 1.8,
            grain_intensity: 22.0,
            grain_seed: 42,
            second_grain_seed: 137,
            second_grain_scale: 0.5,
            aberration_offset: 2,
            vignette_strength: 0.35,
            ascii_floor: 0.05,
            ascii_max: 0.9,
            ascii_power: 3.0,
            text_threshold: 0.4,
            background_level: 0.4,
            brightness_boost: 2.8,
            overlay_downscale: 2,
        }
    }
}

impl PostProcessConfig {
    pub fn from_json_str(json: &str) -> Result<Self, PostProcessError> {
        let config: PostProcessConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PostProcessError> {
        if self.block_size == 0 {
            return Err(PostProcessError::Config("block_size must be > 0".into()));
        }
        if self.overlay_downscale == 0 {
            return Err(PostProcessError::Config("overlay_downscale must be > 0".into()));
        }
        if !(0.0..=1.0).contains(&self.ascii_floor)
            || !(0.0..=1.0).contains(&self.ascii_max)
            || self.ascii_floor > self.ascii_max
        {
            return Err(PostProcessError::Config(format!(
                "ascii opacity must satisfy 0 <= floor <= max <= 1, got {}..{}",
                self.ascii_floor, self.ascii_max
            )));
        }
        if !(0.0..1.0).contains(&self.vignette_strength) {
            return Err(PostProcessError::Config(format!(
                "vignette_strength must be in [0, 1), got {}",
                self.vignette_strength
            )));
        }
        if self.grain_intensity < 0.0 || self.score_power <= 0.0 || self.ascii_power <= 0.0 {
            return Err(PostProcessError::Config(
                "grain intensity must be >= 0 and powers > 0".into(),
            ));
        }
        Ok(())
    }
}
