// Prompt generator: one text model plus its dissonance engine.
//
// The text model itself is external (a small GGUF transformer in
// production, a scripted mock in tests) and is consumed through the
// `TextGenerator` trait. `PromptGenerator` wraps it with:
// - dissonance-aware temperature (`DissonanceEngine::adapt`),
// - an oppositional opening phrase from `templates.rs`,
// - a style suffix for the diffusion model (artist role),
// - a roast context (commentator role).
//
// Each generator owns its engine and RNG outright. Nothing here is shared;
// `dual.rs` borrows two generators mutably and runs them side by side.

use yentyo_prng::YentRng;

use crate::config::EngineConfig;
use crate::dissonance::{DissonanceEngine, Pulse};
use crate::error::{BoxError, Result};
use crate::templates::{pick_roast_opener, pick_starter, pick_style_suffix};

/// Inputs for one call to an external text model.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest<'a> {
    pub context: &'a str,
    pub max_tokens: usize,
    pub temperature: f32,
    pub seed: Option<u64>,
}

/// External text-generation capability.
///
/// Implementations may block on model compute. Output should be a pure
/// function of the request for a given model instance.
pub trait TextGenerator: Send {
    fn generate(&mut self, request: &GenerationRequest<'_>) -> std::result::Result<String, BoxError>;

    /// Short human-readable model description (layers, dims, file name).
    fn describe(&self) -> String {
        "text model".into()
    }
}

/// Text produced by one role plus the scoring that shaped it.
#[derive(Clone, Debug, PartialEq)]
pub struct Reaction {
    pub text: String,
    pub dissonance: f32,
    pub temperature: f32,
    pub pulse: Pulse,
}

pub struct PromptGenerator {
    model: Box<dyn TextGenerator>,
    engine: DissonanceEngine,
    rng: YentRng,
}

impl PromptGenerator {
    /// Wrap `model` with a fresh engine. Fails on invalid tunables.
    pub fn new(model: Box<dyn TextGenerator>, config: EngineConfig, seed: u64) -> Result<Self> {
        let mut rng = YentRng::new(seed);
        let engine = DissonanceEngine::new(config, rng.next_u64())?;
        Ok(Self { model, engine, rng })
    }

    pub fn engine(&self) -> &DissonanceEngine {
        &self.engine
    }

    pub fn describe(&self) -> String {
        self.model.describe()
    }

    /// Artist role: an oppositional visual prompt ending in a style suffix.
    pub fn react(
        &mut self,
        input: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> std::result::Result<Reaction, BoxError> {
        let adaptation = self.engine.adapt(input, temperature);
        let starter = pick_starter(input, &mut self.rng);
        let context = format!("{}\n{}", input.trim(), starter);
        let generated = self.model.generate(&GenerationRequest {
            context: &context,
            max_tokens,
            temperature: adaptation.temperature,
            seed: Some(self.rng.next_u64()),
        })?;

        let body = clean_generation(&generated);
        let bare = if body.is_empty() {
            starter.to_string()
        } else {
            format!("{starter} {body}")
        };
        let suffix = pick_style_suffix(&mut self.rng);

        Ok(Reaction {
            text: format!("{bare}{suffix}"),
            dissonance: adaptation.dissonance,
            temperature: adaptation.temperature,
            pulse: adaptation.pulse,
        })
    }

    /// Commentator role: mocking text about the user's input.
    pub fn roast(
        &mut self,
        input: &str,
        max_tokens: usize,
        temperature: f32,
    ) -> std::result::Result<Reaction, BoxError> {
        let adaptation = self.engine.adapt(input, temperature);
        let opener = pick_roast_opener(&mut self.rng);
        let context = format!("{} \"{}\"\n", opener, input.trim());
        let generated = self.model.generate(&GenerationRequest {
            context: &context,
            max_tokens,
            temperature: adaptation.temperature,
            seed: Some(self.rng.next_u64()),
        })?;

        let body = clean_generation(&generated);
        Ok(Reaction {
            text: if body.is_empty() {
                opener.trim_end_matches(':').to_string()
            } else {
                body
            },
            dissonance: adaptation.dissonance,
            temperature: adaptation.temperature,
            pulse: adaptation.pulse,
        })
    }
}

/// Collapse whitespace and newlines from raw model output.
fn clean_generation(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
