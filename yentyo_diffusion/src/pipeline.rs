// Text-to-image synthesis over external models.
//
// The neural pieces (text encoder, noise-predicting denoiser, latent
// decoder) live outside this crate and are reached through three narrow
// traits. `Synthesizer` owns the deterministic part:
//
// 1. cut the prompt to `max_prompt_chars` characters and encode it (plus an
//    empty prompt when classifier-free guidance is on),
// 2. draw the starting latent from the seed,
// 3. walk the DDIM plan, asking the denoiser for a noise estimate at each
//    timestep and recombining with `StepCoefficients::apply`,
// 4. undo the latent scaling and decode to a `[1, 3, H, W]` tensor in [-1, 1].
//
// Guidance: with scale `g > 1` the noise estimate is
// `eps_uncond + g * (eps_cond - eps_uncond)`; at `g <= 1` only the
// conditioned pass runs.
//
// The scheduler is held behind an `Arc` and the model traits take `&self`,
// so a `Synthesizer` can serve concurrent requests. Each request owns its
// latent outright.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::bridge::tensor_to_rgba;
use crate::config::SynthesisConfig;
use crate::error::{BoxError, DiffusionError, Result};
use crate::latent::random_latent;
use crate::scheduler::DdimScheduler;
use crate::tensor::Tensor;

/// Prompt string to conditioning tensor.
pub trait TextEncoder: Send + Sync {
    fn encode(&self, prompt: &str) -> std::result::Result<Tensor, BoxError>;
}

/// One network evaluation: the noise present in `latent` at `timestep`.
pub trait Denoiser: Send + Sync {
    fn predict_noise(
        &self,
        latent: &Tensor,
        timestep: usize,
        conditioning: &Tensor,
    ) -> std::result::Result<Tensor, BoxError>;

    fn describe(&self) -> String {
        "denoiser".into()
    }
}

/// Latent to `[1, 3, H, W]` image tensor in [-1, 1].
pub trait LatentDecoder: Send + Sync {
    fn decode(&self, latent: &Tensor) -> std::result::Result<Tensor, BoxError>;
}

pub struct Synthesizer {
    scheduler: Arc<DdimScheduler>,
    encoder: Box<dyn TextEncoder>,
    denoiser: Box<dyn Denoiser>,
    decoder: Box<dyn LatentDecoder>,
    config: SynthesisConfig,
}

impl Synthesizer {
    pub fn new(
        scheduler: Arc<DdimScheduler>,
        encoder: Box<dyn TextEncoder>,
        denoiser: Box<dyn Denoiser>,
        decoder: Box<dyn LatentDecoder>,
        config: SynthesisConfig,
    ) -> Result<Self> {
        config.latent_dims()?;
        info!(
            denoiser = %denoiser.describe(),
            width = config.width,
            height = config.height,
            "synthesizer ready"
        );
        Ok(Self {
            scheduler,
            encoder,
            denoiser,
            decoder,
            config,
        })
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Arc<DdimScheduler> {
        &self.scheduler
    }

    pub fn describe(&self) -> String {
        self.denoiser.describe()
    }

    /// Run the full denoising loop and decode. Returns the raw image tensor.
    pub fn synthesize(&self, prompt: &str, seed: u64, steps: usize, guidance: f32) -> Result<Tensor> {
        let start = Instant::now();
        let plan = self.scheduler.plan(steps)?;
        let (lh, lw) = self.config.latent_dims()?;

        let prompt = truncate_chars(prompt, self.config.max_prompt_chars);
        let cond = self.encoder.encode(prompt).map_err(DiffusionError::Encoder)?;
        let uncond = if guidance > 1.0 {
            Some(self.encoder.encode("").map_err(DiffusionError::Encoder)?)
        } else {
            None
        };

        let mut latent = random_latent(
            1,
            self.config.latent_channels,
            lh,
            lw,
            self.scheduler.init_noise_sigma(),
            seed,
        );

        for (i, step) in plan.iter().enumerate() {
            let t = step.timestep;
            let wrap = |source| DiffusionError::Denoiser { timestep: t, source };
            let eps_cond = self.denoiser.predict_noise(&latent, t, &cond).map_err(wrap)?;
            let eps = match &uncond {
                Some(uncond) => {
                    let eps_uncond = self.denoiser.predict_noise(&latent, t, uncond).map_err(wrap)?;
                    eps_cond.axpby(guidance, &eps_uncond, 1.0 - guidance)?
                }
                None => eps_cond,
            };
            latent = step.apply(&latent, &eps)?;
            debug!(step = i + 1, of = plan.len(), timestep = t, "denoise step");
        }

        latent.scale(1.0 / self.config.latent_scaling);
        let image = self.decoder.decode(&latent).map_err(DiffusionError::Decoder)?;
        info!(
            steps,
            seed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "synthesized"
        );
        Ok(image)
    }

    /// `synthesize` followed by `tensor_to_rgba`.
    pub fn synthesize_rgba(
        &self,
        prompt: &str,
        seed: u64,
        steps: usize,
        guidance: f32,
    ) -> Result<image::RgbaImage> {
        tensor_to_rgba(&self.synthesize(prompt, seed, steps, guidance)?)
    }
}

/// First `max` characters of `s`, on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
