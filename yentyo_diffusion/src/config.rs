// Diffusion tunables.
//
// `SchedulerConfig` describes the training-time noise schedule the denoiser
// was trained with; it must match the weights. `SynthesisConfig` describes
// the requested output (pixel size, latent layout, prompt limits). Both are
// serde structs with `#[serde(default)]` so a JSON file only names what it
// overrides.

use serde::{Deserialize, Serialize};

use crate::error::{DiffusionError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub num_train_timesteps: usize,
    pub beta_start: f64,
    pub beta_end: f64,
    /// Use alpha-bar = 1 after the last step (fully denoised), otherwise the
    /// first entry of the training table.
    pub set_alpha_to_one: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            num_train_timesteps: 1000,
            beta_start: 0.00085,
            beta_end: 0.012,
            set_alpha_to_one: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub width: usize,
    pub height: usize,
    pub latent_channels: usize,
    /// Pixels per latent cell along each axis.
    pub vae_scale_factor: usize,
    /// Latents are divided by this before decoding.
    pub latent_scaling: f32,
    /// Prompts are cut to this many characters before encoding.
    pub max_prompt_chars: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            latent_channels: 4,
            vae_scale_factor: 8,
            latent_scaling: 0.18215,
            max_prompt_chars: 200,
        }
    }
}

impl SynthesisConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SynthesisConfig = serde_json::from_str(json)?;
        config.latent_dims()?;
        Ok(config)
    }

    /// Latent (height, width), checking the pixel size divides evenly.
    pub fn latent_dims(&self) -> Result<(usize, usize)> {
        let f = self.vae_scale_factor;
        if f == 0 || self.width == 0 || self.height == 0 || self.latent_channels == 0 {
            return Err(DiffusionError::Config(format!(
                "zero-sized synthesis: {}x{} px, {} channels, factor {f}",
                self.width, self.height, self.latent_channels
            )));
        }
        if self.width % f != 0 || self.height % f != 0 {
            return Err(DiffusionError::Config(format!(
                "{}x{} px is not divisible by the VAE factor {f}",
                self.width, self.height
            )));
        }
        if self.latent_scaling <= 0.0 {
            return Err(DiffusionError::Config("latent_scaling must be positive".into()));
        }
        Ok((self.height / f, self.width / f))
    }
}
