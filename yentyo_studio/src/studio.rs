// The studio: one full interaction from user text to finished image.
//
// `Studio::react` runs, in order:
// 1. request normalization (defaults, blank-input rejection),
// 2. the dual orchestrator (artist prompt + commentator roast),
// 3. when image models were supplied, DDIM synthesis seeded from the
//    studio RNG on the trimmed prompt, then artifact-aware post-processing
//    with the artist's bare words as overlay text,
// 4. storage of the finished image under a fresh `ImageId`.
//
// Whole interactions are serialized behind `session`; two callers never
// interleave turns, so artist roles alternate strictly in arrival order.
// Finished images live in a separate bounded store so `image()` lookups never
// wait on a running interaction. The store evicts oldest-first.
//
// Any stage failing aborts the interaction with its error. The orchestrator
// has already advanced its turn by then, so roles keep alternating.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use image::RgbaImage;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};
use yentyo_core::{DualOrchestrator, PromptGenerator, TextGenerator};
use yentyo_diffusion::{DdimScheduler, Denoiser, LatentDecoder, Synthesizer, TextEncoder};
use yentyo_diffusion::pipeline::truncate_chars;
use yentyo_postprocess::PostProcessor;
use yentyo_prng::YentRng;
use yentyo_protocol::{HealthResponse, ImageId, ReactRequest, ReactResponse, YENTYO_VERSION};

use crate::config::StudioConfig;
use crate::error::{Result, StudioError};

/// The external image models. The studio wraps them with a scheduler,
/// synthesizer and post-processor built from its own `StudioConfig`.
pub struct ImageModels {
    pub encoder: Box<dyn TextEncoder>,
    pub denoiser: Box<dyn Denoiser>,
    pub decoder: Box<dyn LatentDecoder>,
    /// Reported by `Studio::health`; defaults to the denoiser's description.
    pub name: Option<String>,
}

impl ImageModels {
    pub fn new(
        encoder: Box<dyn TextEncoder>,
        denoiser: Box<dyn Denoiser>,
        decoder: Box<dyn LatentDecoder>,
    ) -> Self {
        Self {
            encoder,
            denoiser,
            decoder,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Synthesizer plus post-processor: everything between a prompt and a
/// finished image.
pub struct ImagePipeline {
    synthesizer: Synthesizer,
    postprocessor: PostProcessor,
    name: String,
}

impl ImagePipeline {
    /// Build the DDIM scheduler, synthesizer and post-processor from the
    /// `scheduler`, `synthesis` and `postprocess` sections of `config`.
    pub fn from_config(models: ImageModels, config: &StudioConfig) -> Result<Self> {
        let scheduler = Arc::new(DdimScheduler::new(config.scheduler.clone())?);
        let available = scheduler.num_train_timesteps();
        if config.steps == 0 || config.steps > available {
            return Err(StudioError::Config(format!(
                "steps must be in 1..={available}, got {}",
                config.steps
            )));
        }
        let ImageModels {
            encoder,
            denoiser,
            decoder,
            name,
        } = models;
        let name = name.unwrap_or_else(|| denoiser.describe());
        let synthesizer = Synthesizer::new(
            scheduler,
            encoder,
            denoiser,
            decoder,
            config.synthesis.clone(),
        )?;
        let postprocessor = PostProcessor::new(config.postprocess.clone())?;
        Ok(Self {
            synthesizer,
            postprocessor,
            name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    pub fn postprocessor(&self) -> &PostProcessor {
        &self.postprocessor
    }

    pub fn render(
        &self,
        prompt: &str,
        words: &str,
        seed: u64,
        steps: usize,
        guidance: f32,
    ) -> Result<RgbaImage> {
        let raw = self.synthesizer.synthesize_rgba(prompt, seed, steps, guidance)?;
        Ok(self.postprocessor.run(&raw, words))
    }
}

/// Bounded id → image map, oldest evicted first.
pub(crate) struct ImageStore {
    images: FxHashMap<ImageId, RgbaImage>,
    order: VecDeque<ImageId>,
    capacity: usize,
}

impl ImageStore {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            images: FxHashMap::default(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn insert(&mut self, id: ImageId, image: RgbaImage) {
        if self.images.insert(id, image).is_none() {
            self.order.push_back(id);
        }
        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.images.remove(&old);
                debug!(image = %old, "evicted image");
            }
        }
    }

    pub(crate) fn get(&self, id: ImageId) -> Option<&RgbaImage> {
        self.images.get(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.images.len()
    }
}

struct Session {
    dual: DualOrchestrator,
    rng: YentRng,
    next_image: u64,
}

pub struct Studio {
    session: Mutex<Session>,
    images: Mutex<ImageStore>,
    pipeline: Option<ImagePipeline>,
    config: StudioConfig,
    model_a: String,
    model_b: String,
}

impl Studio {
    /// Build a studio around two text models and, optionally, the image
    /// models. Every tunable comes from `config`; nothing is checked later
    /// per request. Each generator's RNG is seeded from a studio RNG derived
    /// from `seed`.
    pub fn new(
        model_a: Box<dyn TextGenerator>,
        model_b: Box<dyn TextGenerator>,
        image: Option<ImageModels>,
        config: StudioConfig,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        let pipeline = image
            .map(|models| ImagePipeline::from_config(models, &config))
            .transpose()?;
        let mut rng = YentRng::new(seed);
        let a = PromptGenerator::new(model_a, config.engine.clone(), rng.next_u64())?;
        let b = PromptGenerator::new(model_b, config.engine.clone(), rng.next_u64())?;
        let (model_a, model_b) = (a.describe(), b.describe());
        let dual = DualOrchestrator::new(a, b, &config.engine.temperature);

        info!(
            model_a = %model_a,
            model_b = %model_b,
            image = pipeline.as_ref().map_or("none", |p| p.name()),
            "studio ready"
        );
        Ok(Self {
            session: Mutex::new(Session {
                dual,
                rng,
                next_image: 1,
            }),
            images: Mutex::new(ImageStore::new(config.max_stored_images)),
            pipeline,
            config,
            model_a,
            model_b,
        })
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn has_pipeline(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn pipeline(&self) -> Option<&ImagePipeline> {
        self.pipeline.as_ref()
    }

    /// One complete interaction.
    pub fn react(&self, request: &ReactRequest) -> Result<ReactResponse> {
        let start = Instant::now();
        let params = request.normalize_with(
            self.config.default_max_tokens,
            self.config.default_temperature,
        )?;

        let mut session = lock(&self.session)?;
        let result = session
            .dual
            .react(&params.input, params.max_tokens, params.temperature)?;

        let image_id = match &self.pipeline {
            Some(pipeline) => {
                let seed = session.rng.next_u64();
                let prompt = truncate_chars(
                    result.prompt.trim(),
                    self.config.synthesis.max_prompt_chars,
                );
                let image = pipeline.render(
                    prompt,
                    &result.yent_words,
                    seed,
                    self.config.steps,
                    self.config.guidance,
                )?;
                let id = ImageId(session.next_image);
                session.next_image += 1;
                lock(&self.images)?.insert(id, image);
                Some(id)
            }
            None => {
                warn!("no image pipeline configured; skipping synthesis");
                None
            }
        };
        drop(session);

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            artist = %result.artist_id,
            dissonance = result.dissonance,
            temperature = result.temperature,
            image = ?image_id,
            elapsed_ms,
            "interaction complete"
        );
        Ok(ReactResponse {
            prompt: result.prompt,
            yent_words: result.yent_words,
            roast: result.roast,
            artist_id: result.artist_id.to_string(),
            image_id,
            dissonance: result.dissonance,
            temperature: result.temperature,
            elapsed_ms,
        })
    }

    /// A stored image by id. Evicted or never-issued ids are `ImageNotFound`.
    pub fn image(&self, id: ImageId) -> Result<RgbaImage> {
        lock(&self.images)?
            .get(id)
            .cloned()
            .ok_or(StudioError::ImageNotFound(id))
    }

    pub fn stored_images(&self) -> Result<usize> {
        Ok(lock(&self.images)?.len())
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            version: YENTYO_VERSION.to_string(),
            model_a: self.model_a.clone(),
            model_b: self.model_b.clone(),
            sd_model: self
                .pipeline
                .as_ref()
                .map(|p| p.name().to_string())
                .unwrap_or_default(),
            ready: !self.session.is_poisoned(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| StudioError::Poisoned)
}
