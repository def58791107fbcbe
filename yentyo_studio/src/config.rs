// Top-level studio configuration.
//
// Aggregates the per-crate tunables plus the per-request defaults and the
// diffusion sampling settings, so a whole deployment is one JSON document.
// Every section is `#[serde(default)]`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use yentyo_core::EngineConfig;
use yentyo_diffusion::{DdimScheduler, SchedulerConfig, SynthesisConfig};
use yentyo_postprocess::PostProcessConfig;
use yentyo_protocol::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

use crate::error::{Result, StudioError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub engine: EngineConfig,
    pub scheduler: SchedulerConfig,
    pub synthesis: SynthesisConfig,
    pub postprocess: PostProcessConfig,
    pub default_max_tokens: usize,
    pub default_temperature: f32,
    /// Denoising steps per image.
    pub steps: usize,
    /// Classifier-free guidance scale.
    pub guidance: f32,
    /// Oldest images are dropped beyond this many.
    pub max_stored_images: usize,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            scheduler: SchedulerConfig::default(),
            synthesis: SynthesisConfig::default(),
            postprocess: PostProcessConfig::default(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            default_temperature: DEFAULT_TEMPERATURE,
            steps: 10,
            guidance: 7.5,
            max_stored_images: 64,
        }
    }
}

impl StudioConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: StudioConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StudioError::ResourceNotFound(path.display().to_string())
            } else {
                StudioError::Io(e)
            }
        })?;
        Self::from_json_str(&data)
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        DdimScheduler::new(self.scheduler.clone())?;
        self.synthesis.latent_dims()?;
        self.postprocess.validate()?;
        if self.steps == 0 || self.steps > self.scheduler.num_train_timesteps {
            return Err(StudioError::Config(format!(
                "steps must be in 1..={}, got {}",
                self.scheduler.num_train_timesteps, self.steps
            )));
        }
        if self.default_max_tokens == 0 || !(self.default_temperature > 0.0) {
            return Err(StudioError::Config(
                "request defaults must be positive".into(),
            ));
        }
        if self.max_stored_images == 0 {
            return Err(StudioError::Config("max_stored_images must be > 0".into()));
        }
        Ok(())
    }
}
