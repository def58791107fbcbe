// yentyo_core — the reacting half of the yent.yo artist.
//
// User text is scored for novelty and emotional charge, turned into a
// sampling temperature, and handed to two small text models running side by
// side: the artist writes an oppositional visual prompt for the diffusion
// model, the commentator writes a roast. This crate owns that text side; the
// image side lives in `yentyo_diffusion` and `yentyo_postprocess`.
//
// Module overview:
// - `features.rs`:   words/bigrams/trigrams extraction, Jaccard similarity.
// - `dissonance.rs`: `DissonanceEngine` (word cloud, boredom, `Pulse`) and
//                    temperature adaptation.
// - `templates.rs`:  oppositional reaction templates, style suffixes, overlay
//                    delimiters.
// - `generator.rs`:  `TextGenerator` trait for the external model and the
//                    `PromptGenerator` wrapper (artist `react`, commentator
//                    `roast`).
// - `dual.rs`:       `DualOrchestrator`, alternating roles and the
//                    concurrent artist/commentator join.
// - `config.rs`:     serde tunables with reference defaults.
// - `error.rs`:      `YentError` and the crate `Result`.
//
// Randomness: every stochastic choice draws from a `yentyo_prng::YentRng`
// owned by the generator or engine that makes it, seeded explicitly.

pub mod config;
pub mod dissonance;
pub mod dual;
pub mod error;
pub mod features;
pub mod generator;
pub mod templates;

pub use config::{DissonanceConfig, EngineConfig, TemperatureConfig};
pub use dissonance::{Adaptation, DissonanceEngine, Pulse, WordCloud};
pub use dual::{DualOrchestrator, DualResult, ModelId, RoleState};
pub use error::{BoxError, Result, Role, YentError};
pub use generator::{GenerationRequest, PromptGenerator, Reaction, TextGenerator};
