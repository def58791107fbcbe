// Dual orchestrator: two generators, two roles, one interaction.
//
// Each interaction one generator plays the artist (its text becomes the
// diffusion prompt) and the other plays the commentator (its text mocks the
// user). Roles strictly alternate through `RoleState`; there is no
// randomness in who draws. The first interaction after construction has
// model B as artist, then A, then B, and so on.
//
// Both generators run concurrently under `rayon::join`, which returns only
// after both closures finish. A failure in either is fatal to the
// interaction; no partial result is returned. The turn still advances, so
// roles keep alternating after a failed interaction.
//
// After the join, the artist's text is cut at the earliest overlay delimiter
// to recover the bare words for the ASCII overlay, while the full text (with
// its style suffix) is the diffusion prompt.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TemperatureConfig;
use crate::dissonance::Pulse;
use crate::error::{Result, Role, YentError};
use crate::generator::PromptGenerator;
use crate::templates::strip_style_suffix;

/// Which of the two loaded models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    A,
    B,
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelId::A => write!(f, "A"),
            ModelId::B => write!(f, "B"),
        }
    }
}

/// Who draws in the next interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleState {
    AIsArtist,
    BIsArtist,
}

impl RoleState {
    pub fn artist(self) -> ModelId {
        match self {
            RoleState::AIsArtist => ModelId::A,
            RoleState::BIsArtist => ModelId::B,
        }
    }

    pub fn commentator(self) -> ModelId {
        match self {
            RoleState::AIsArtist => ModelId::B,
            RoleState::BIsArtist => ModelId::A,
        }
    }

    pub fn next(self) -> Self {
        match self {
            RoleState::AIsArtist => RoleState::BIsArtist,
            RoleState::BIsArtist => RoleState::AIsArtist,
        }
    }
}

/// Combined output of one interaction.
#[derive(Clone, Debug, PartialEq)]
pub struct DualResult {
    /// Artist's full text, style suffix included. Goes to diffusion.
    pub prompt: String,
    /// Artist's text before the style suffix. Goes to the ASCII overlay.
    pub yent_words: String,
    /// Commentator's mockery.
    pub roast: String,
    pub artist_id: ModelId,
    /// Artist-side scoring of the input.
    pub dissonance: f32,
    pub temperature: f32,
    pub pulse: Pulse,
}

pub struct DualOrchestrator {
    a: PromptGenerator,
    b: PromptGenerator,
    state: RoleState,
    turn: u64,
    commentator_tokens: usize,
    commentator_bump: f32,
}

impl DualOrchestrator {
    pub fn new(a: PromptGenerator, b: PromptGenerator, temperature: &TemperatureConfig) -> Self {
        Self {
            a,
            b,
            state: RoleState::BIsArtist,
            turn: 0,
            commentator_tokens: temperature.commentator_tokens,
            commentator_bump: temperature.commentator_bump,
        }
    }

    /// Interactions started so far.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Roles for the next interaction.
    pub fn next_roles(&self) -> RoleState {
        self.state
    }

    pub fn model(&self, id: ModelId) -> &PromptGenerator {
        match id {
            ModelId::A => &self.a,
            ModelId::B => &self.b,
        }
    }

    /// Run artist and commentator concurrently on `input`.
    pub fn react(&mut self, input: &str, max_tokens: usize, temperature: f32) -> Result<DualResult> {
        let roles = self.state;
        self.state = roles.next();
        self.turn += 1;
        debug!(turn = self.turn, artist = %roles.artist(), "dual reaction");

        let (artist, commentator) = match roles {
            RoleState::AIsArtist => (&mut self.a, &mut self.b),
            RoleState::BIsArtist => (&mut self.b, &mut self.a),
        };
        let roast_tokens = self.commentator_tokens;
        let roast_temperature = temperature + self.commentator_bump;

        let (art, roast) = rayon::join(
            || artist.react(input, max_tokens, temperature),
            || commentator.roast(input, roast_tokens, roast_temperature),
        );
        let art = art.map_err(|source| YentError::Generation {
            role: Role::Artist,
            source,
        })?;
        let roast = roast.map_err(|source| YentError::Generation {
            role: Role::Commentator,
            source,
        })?;

        let yent_words = strip_style_suffix(&art.text).trim().to_string();
        Ok(DualResult {
            yent_words,
            prompt: art.text,
            roast: roast.text,
            artist_id: roles.artist(),
            dissonance: art.dissonance,
            temperature: art.temperature,
            pulse: art.pulse,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::EngineConfig;
    use crate::error::BoxError;
    use crate::generator::tests::Scripted;
    use crate::generator::{GenerationRequest, TextGenerator};
    use crate::templates::OVERLAY_DELIMITERS;

    /// Logs (name, max_tokens, temperature) for every request.
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<(&'static str, usize, f32)>>>,
    }

    impl TextGenerator for Recorder {
        fn generate(&mut self, request: &GenerationRequest<'_>) -> std::result::Result<String, BoxError> {
            self.log
                .lock()
                .unwrap()
                .push((self.name, request.max_tokens, request.temperature));
            Ok(format!("words from {}", self.name))
        }
    }

    struct Broken;

    impl TextGenerator for Broken {
        fn generate(&mut self, _request: &GenerationRequest<'_>) -> std::result::Result<String, BoxError> {
            Err("model exploded".into())
        }
    }

    fn generator(model: Box<dyn TextGenerator>, seed: u64) -> PromptGenerator {
        PromptGenerator::new(model, EngineConfig::default(), seed).unwrap()
    }

    fn scripted_pair() -> DualOrchestrator {
        DualOrchestrator::new(
            generator(Box::new(Scripted::new("from a")), 1),
            generator(Box::new(Scripted::new("from b")), 2),
            &TemperatureConfig::default(),
        )
    }

    #[test]
    fn roles_alternate_starting_with_b() {
        let mut dual = scripted_pair();
        let ids: Vec<ModelId> = (0..4)
            .map(|_| dual.react("hello", 30, 0.8).unwrap().artist_id)
            .collect();
        assert_eq!(ids, vec![ModelId::B, ModelId::A, ModelId::B, ModelId::A]);
        assert_eq!(dual.turn(), 4);
    }

    #[test]
    fn artist_text_drives_prompt_and_words() {
        let mut dual = scripted_pair();
        let result = dual.react("draw me a duck", 30, 0.8).unwrap();
        assert!(result.prompt.contains("from b"));
        assert!(result.yent_words.ends_with("from b"));
        assert!(!OVERLAY_DELIMITERS.iter().any(|d| result.yent_words.contains(d)));
        assert!(OVERLAY_DELIMITERS.iter().any(|d| result.prompt.contains(d)));
        assert_eq!(result.roast, "from a");
    }

    #[test]
    fn commentator_gets_its_own_budget_and_heat() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dual = DualOrchestrator::new(
            generator(Box::new(Recorder { name: "a", log: log.clone() }), 1),
            generator(Box::new(Recorder { name: "b", log: log.clone() }), 2),
            &TemperatureConfig::default(),
        );
        dual.react("the weather is nice", 30, 0.5).unwrap();

        let entries = log.lock().unwrap().clone();
        assert_eq!(entries.len(), 2);
        let artist = entries.iter().find(|e| e.0 == "b").unwrap();
        let commentator = entries.iter().find(|e| e.0 == "a").unwrap();
        assert_eq!(artist.1, 30);
        assert_eq!(commentator.1, 50);
        // Both engines are fresh and saw the same input, so the only
        // difference in temperature is the commentator bump.
        assert!((commentator.2 - artist.2 - 0.2).abs() < 1e-4);
    }

    #[test]
    fn either_failure_is_fatal() {
        let mut dual = DualOrchestrator::new(
            generator(Box::new(Scripted::new("fine")), 1),
            generator(Box::new(Broken), 2),
            &TemperatureConfig::default(),
        );
        // Turn 1: B is artist.
        let err = dual.react("hello", 30, 0.8).unwrap_err();
        assert!(matches!(err, YentError::Generation { role: Role::Artist, .. }));
        // Turn 2: B is commentator.
        let err = dual.react("hello", 30, 0.8).unwrap_err();
        assert!(matches!(err, YentError::Generation { role: Role::Commentator, .. }));
        assert_eq!(dual.next_roles(), RoleState::BIsArtist);
    }

    #[test]
    fn role_state_machine() {
        assert_eq!(RoleState::AIsArtist.next(), RoleState::BIsArtist);
        assert_eq!(RoleState::BIsArtist.next().next(), RoleState::BIsArtist);
        assert_eq!(RoleState::AIsArtist.artist(), ModelId::A);
        assert_eq!(RoleState::AIsArtist.commentator(), ModelId::B);
        assert_eq!(ModelId::B.to_string(), "B");
    }

    #[test]
    fn model_lookup_describes_each_side() {
        let dual = scripted_pair();
        assert_eq!(dual.model(ModelId::A).describe(), "scripted");
        assert_eq!(dual.model(ModelId::B).engine().boredom_count(), 0);
    }
}
