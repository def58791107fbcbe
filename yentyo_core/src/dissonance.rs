// Dissonance engine: per-generator memory of what the user has been saying.
//
// Each `PromptGenerator` owns one `DissonanceEngine`. The engine keeps a
// decaying `WordCloud` of recently seen features and a boredom counter, and
// turns every input into a dissonance scalar plus a `Pulse` snapshot
// (novelty, arousal, entropy). `adapt_temperature` maps those onto the
// sampling temperature for the next generation.
//
// Scoring order for one call to `compute_dissonance`:
//   1. extract features (words, bigrams, trigrams)
//   2. similarity = Jaccard(features, cloud keys); novelty = 1 - similarity
//   3. base dissonance = novelty, or 1.0 when the cloud is empty
//   4. blend in arousal/entropy by `pulse_weight`
//   5. boredom rule: a recognized repeat (similarity above threshold, or the
//      exact same normalized input as last time) damps dissonance and bumps
//      the counter; once the counter reaches the threshold dissonance is
//      forced back up. Novel input resets the counter.
//   6. morph the cloud: seen features move toward 1, the rest decay
// Scoring happens before morphing, so a feature's first appearance is
// scored against a cloud that does not contain it yet.
//
// Not synchronized. Concurrent interactions must serialize access to the
// owning generator (the studio holds a mutex around the whole pipeline).

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};
use yentyo_prng::YentRng;

use crate::config::{DissonanceConfig, EngineConfig, TemperatureConfig};
use crate::error::Result;
use crate::features::{FeatureSet, extract_features, jaccard_index, words};

/// Emotionally charged words that raise arousal.
pub const AROUSAL_WORDS: &[&str] = &[
    "hate", "love", "die", "death", "dead", "kill", "fuck", "fucking", "shit", "sad", "angry",
    "rage", "furious", "cry", "crying", "scream", "fear", "afraid", "scared", "hurt", "pain",
    "blood", "war", "destroy", "alone", "lonely", "depressed", "suicide", "help", "please",
    "never", "always", "ненавижу", "люблю", "смерть", "боль", "страх",
];

/// Is `word` (already lower-cased) in the arousal lexicon? Surrounding
/// punctuation is ignored.
pub fn is_arousal_word(word: &str) -> bool {
    let trimmed = word.trim_matches(|c: char| !c.is_alphanumeric());
    AROUSAL_WORDS.contains(&trimmed)
}

/// Emotional snapshot of one input. Every field is in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    pub novelty: f32,
    pub arousal: f32,
    pub entropy: f32,
}

/// Decaying weighted memory of recently seen features.
///
/// Weights stay in [0, 1]. Entries are never removed, only decayed, so the
/// key set (which drives similarity) only grows over a session.
#[derive(Clone, Debug, Default)]
pub struct WordCloud {
    weights: FxHashMap<String, f32>,
}

impl WordCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of a feature, 0 if never seen.
    pub fn weight(&self, feature: &str) -> f32 {
        self.weights.get(feature).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Jaccard similarity between `features` and the cloud's key set.
    pub fn similarity(&self, features: &FeatureSet) -> f32 {
        let intersection = features
            .iter()
            .filter(|f| self.weights.contains_key(f.as_str()))
            .count();
        jaccard_index(intersection, features.len(), self.weights.len())
    }

    /// Push every feature in `features` toward 1 by `blend` and decay every
    /// other entry by `decay`.
    pub fn morph(&mut self, features: &FeatureSet, blend: f32, decay: f32) {
        for (key, weight) in self.weights.iter_mut() {
            if !features.contains(key) {
                *weight = (*weight * decay).max(0.0);
            }
        }
        for feature in features {
            let weight = self.weights.entry(feature.clone()).or_insert(0.0);
            *weight = (*weight + (1.0 - *weight) * blend).min(1.0);
        }
    }
}

/// Result of `DissonanceEngine::adapt`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adaptation {
    pub temperature: f32,
    pub dissonance: f32,
    pub pulse: Pulse,
}

/// Stateful novelty/boredom tracker owned by one generator.
#[derive(Clone, Debug)]
pub struct DissonanceEngine {
    config: EngineConfig,
    cloud: WordCloud,
    boredom_count: u32,
    last_input_hash: Option<u64>,
    rng: YentRng,
}

impl DissonanceEngine {
    /// Create an engine with an empty cloud. `seed` drives the decay jitter.
    /// Fails on invalid tunables (an inverted temperature band, weights
    /// outside [0, 1]).
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cloud: WordCloud::new(),
            boredom_count: 0,
            last_input_hash: None,
            rng: YentRng::new(seed),
        })
    }

    pub fn cloud(&self) -> &WordCloud {
        &self.cloud
    }

    pub fn boredom_count(&self) -> u32 {
        self.boredom_count
    }

    pub fn last_input_hash(&self) -> Option<u64> {
        self.last_input_hash
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score `text` against recent history and remember it.
    pub fn compute_dissonance(&mut self, text: &str) -> (f32, Pulse) {
        let cfg: &DissonanceConfig = &self.config.dissonance;
        let tokens = words(text);
        let features = extract_features(text);

        let similarity = self.cloud.similarity(&features);
        let pulse = Pulse {
            novelty: (1.0 - similarity).clamp(0.0, 1.0),
            arousal: arousal(&tokens),
            entropy: entropy(&tokens),
        };

        let base = if self.cloud.is_empty() {
            1.0
        } else {
            pulse.novelty
        };
        let mut dissonance = (1.0 - cfg.pulse_weight) * base
            + cfg.pulse_weight * 0.5 * (pulse.arousal + pulse.entropy);

        let hash = input_hash(&tokens);
        let repeat = !self.cloud.is_empty()
            && (similarity > cfg.repeat_threshold || self.last_input_hash == Some(hash));
        if repeat {
            self.boredom_count += 1;
            dissonance *= cfg.repeat_damping;
            if self.boredom_count >= cfg.boredom_threshold {
                let extra = (self.boredom_count - cfg.boredom_threshold) as f32;
                dissonance = dissonance.max(cfg.boredom_floor) + cfg.boredom_step * extra;
            }
        } else {
            self.boredom_count = 0;
        }
        let dissonance = dissonance.clamp(0.0, 1.0);

        let decay = if cfg.decay_jitter > 0.0 {
            cfg.cloud_decay + self.rng.range_f32(-cfg.decay_jitter, cfg.decay_jitter)
        } else {
            cfg.cloud_decay
        };
        let (blend, decay) = (cfg.cloud_blend, decay.clamp(0.0, 1.0));
        self.cloud.morph(&features, blend, decay);
        self.last_input_hash = Some(hash);

        (dissonance, pulse)
    }

    /// Score `text` and derive a sampling temperature from `base_temp`.
    pub fn adapt(&mut self, text: &str, base_temp: f32) -> Adaptation {
        let (dissonance, pulse) = self.compute_dissonance(text);
        let t: &TemperatureConfig = &self.config.temperature;
        let threshold = self.config.dissonance.boredom_threshold;

        let mut temperature =
            base_temp + t.dissonance_gain * (dissonance - 0.5) + t.arousal_gain * pulse.arousal;
        if self.boredom_count >= threshold {
            temperature += t.boredom_gain * (self.boredom_count - threshold + 1) as f32;
        }
        let temperature = if temperature.is_nan() {
            t.min
        } else {
            temperature.clamp(t.min, t.max)
        };

        Adaptation {
            temperature,
            dissonance,
            pulse,
        }
    }

    /// Temperature for the next generation, clamped to the configured band.
    pub fn adapt_temperature(&mut self, text: &str, base_temp: f32) -> f32 {
        self.adapt(text, base_temp).temperature
    }
}

/// Fraction of tokens in the arousal lexicon, saturating at 1.
fn arousal(tokens: &[String]) -> f32 {
    if tokens.is_empty() {
        return 0.0;
    }
    let matches = tokens.iter().filter(|w| is_arousal_word(w)).count();
    (matches as f32 / tokens.len() as f32).min(1.0)
}

/// Shannon entropy of the token histogram, normalized by its maximum
/// (`ln n` for `n` tokens). 0 for empty or single-token input.
fn entropy(tokens: &[String]) -> f32 {
    let n = tokens.len();
    if n <= 1 {
        return 0.0;
    }
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }
    let h: f64 = counts
        .values()
        .map(|&c| {
            let p = c as f64 / n as f64;
            -p * p.ln()
        })
        .sum();
    ((h / (n as f64).ln()) as f32).clamp(0.0, 1.0)
}

fn input_hash(tokens: &[String]) -> u64 {
    let mut hasher = FxHasher::default();
    tokens.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::YentError;

    fn engine() -> DissonanceEngine {
        DissonanceEngine::new(EngineConfig::default(), 42).unwrap()
    }

    #[test]
    fn inverted_temperature_band_rejected_at_construction() {
        let mut config = EngineConfig::default();
        config.temperature.min = 2.0;
        config.temperature.max = 1.0;
        assert!(matches!(
            DissonanceEngine::new(config, 1),
            Err(YentError::Config(_))
        ));
    }

    #[test]
    fn first_input_is_novel() {
        let mut e = engine();
        let (d, pulse) = e.compute_dissonance("hello world");
        assert!(d >= 0.5, "first input dissonance = {d}");
        assert!(pulse.novelty >= 0.5, "first input novelty = {}", pulse.novelty);
    }

    #[test]
    fn repeated_input_drops() {
        let mut e = engine();
        let (d1, _) = e.compute_dissonance("hello world");
        let (d2, _) = e.compute_dissonance("hello world");
        assert!(d2 < d1, "d2={d2} should be < d1={d1}");
    }

    #[test]
    fn boredom_raises_dissonance_again() {
        let mut e = engine();
        e.compute_dissonance("hello");
        e.compute_dissonance("hello");
        e.compute_dissonance("hello");
        let (d, _) = e.compute_dissonance("hello");
        assert!(e.boredom_count() >= 2, "boredom = {}", e.boredom_count());
        assert!(d >= 0.5, "annoyed dissonance = {d}");
    }

    #[test]
    fn novel_input_resets_boredom() {
        let mut e = engine();
        for _ in 0..4 {
            e.compute_dissonance("hello");
        }
        assert!(e.boredom_count() > 0);
        e.compute_dissonance("completely different words arrive now");
        assert_eq!(e.boredom_count(), 0);
    }

    #[test]
    fn cloud_morphing() {
        let mut e = engine();
        e.compute_dissonance("hello world");
        assert!(e.cloud().weight("hello") > 0.05);
        assert!(e.cloud().weight("world") > 0.05);
        assert!(e.cloud().weight("hello world") > 0.05);
        assert_eq!(e.cloud().weight("banana"), 0.0);
    }

    #[test]
    fn cloud_decays_absent_features() {
        let mut e = engine();
        e.compute_dissonance("hello");
        let before = e.cloud().weight("hello");
        e.compute_dissonance("goodbye");
        let after = e.cloud().weight("hello");
        assert!(after < before, "absent feature should decay: {before} -> {after}");
        assert!(after > 0.0);
    }

    #[test]
    fn cloud_weights_stay_in_unit_range() {
        let mut e = engine();
        for _ in 0..50 {
            e.compute_dissonance("same words over and over");
        }
        assert!(e.cloud().weight("same") <= 1.0);
        assert!(e.cloud().weight("same") > 0.9);
    }

    #[test]
    fn arousal_responds_to_lexicon() {
        let mut e = engine();
        let (_, hot) = e.compute_dissonance("I hate everything and I want to die");
        assert!(hot.arousal > 0.0);
        let mut e2 = engine();
        let (_, calm) = e2.compute_dissonance("the weather is nice today");
        assert!(calm.arousal < hot.arousal);
    }

    #[test]
    fn arousal_ignores_punctuation() {
        assert!(is_arousal_word("hate!"));
        assert!(is_arousal_word("\"love\""));
        assert!(!is_arousal_word("weather"));
    }

    #[test]
    fn entropy_extremes() {
        let mut e = engine();
        let (_, unique) = e.compute_dissonance("alpha beta gamma delta epsilon");
        assert!(unique.entropy >= 0.9, "unique entropy = {}", unique.entropy);
        let mut e2 = engine();
        let (_, same) = e2.compute_dissonance("the the the the the");
        assert!(same.entropy <= 0.3, "same entropy = {}", same.entropy);
        let (_, single) = e2.compute_dissonance("word");
        assert_eq!(single.entropy, 0.0);
    }

    #[test]
    fn pulse_in_unit_range() {
        let mut e = engine();
        for input in ["hi", "I love you so much", "the quick brown fox", "a a a a a a a a", ""] {
            let (d, pulse) = e.compute_dissonance(input);
            for (name, v) in [
                ("dissonance", d),
                ("novelty", pulse.novelty),
                ("arousal", pulse.arousal),
                ("entropy", pulse.entropy),
            ] {
                assert!((0.0..=1.0).contains(&v), "{name} for {input:?} = {v}");
            }
        }
    }

    #[test]
    fn empty_input_on_fresh_engine() {
        let mut e = engine();
        let (d, pulse) = e.compute_dissonance("");
        assert!(d >= 0.5);
        assert_eq!(pulse.entropy, 0.0);
        assert_eq!(pulse.arousal, 0.0);
        assert!(e.cloud().is_empty());
    }

    #[test]
    fn temperature_stays_in_band() {
        let mut e = engine();
        let inputs = [
            "hi",
            "the meaning of life",
            "I fucking hate everything",
            "a",
            "",
            "the quick brown fox jumps over the lazy dog and then does it again",
        ];
        for input in inputs {
            for base in [0.0, 0.8, 5.0, -3.0] {
                let t = e.adapt_temperature(input, base);
                assert!((0.3..=1.5).contains(&t), "temp({input:?}, {base}) = {t}");
            }
        }
    }

    #[test]
    fn nan_base_temperature_falls_back_to_min() {
        let mut e = engine();
        assert_eq!(e.adapt_temperature("hi", f32::NAN), 0.3);
    }

    #[test]
    fn boredom_heats_up_temperature() {
        let mut e = engine();
        let temps: Vec<f32> = (0..5).map(|_| e.adapt_temperature("hi", 0.8)).collect();
        assert!(
            temps[4] > temps[0],
            "repeating should eventually raise temperature: {temps:?}"
        );
    }

    #[test]
    fn same_seed_same_history() {
        let mut a = engine();
        let mut b = engine();
        for input in ["one two", "three", "one two", "four five six"] {
            assert_eq!(a.compute_dissonance(input), b.compute_dissonance(input));
        }
        assert_eq!(a.cloud().weight("one"), b.cloud().weight("one"));
    }
}
