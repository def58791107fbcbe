// Data-driven tunables for the dissonance engine and temperature adaptation.
//
// The thresholds and decay constants here are empirically chosen "feel"
// values, not derived from a model. They live in serde structs so they can
// be tweaked from JSON without recompiling; the `Default` impls hold the
// reference values. Every struct is `#[serde(default)]`, so a JSON file only
// needs the fields it overrides.
//
// See also: `dissonance.rs` (reads `DissonanceConfig` + `TemperatureConfig`),
// `dual.rs` (reads the commentator fields of `TemperatureConfig`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, YentError};

/// Scoring and cloud-morphing constants for one dissonance engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DissonanceConfig {
    /// Similarity above which an input counts as a recognized repeat.
    pub repeat_threshold: f32,
    /// Multiplier applied to dissonance on a recognized repeat.
    pub repeat_damping: f32,
    /// Consecutive repeats after which the engine gets annoyed.
    pub boredom_threshold: u32,
    /// Dissonance floor once annoyed.
    pub boredom_floor: f32,
    /// Extra dissonance per repeat beyond the threshold.
    pub boredom_step: f32,
    /// Share of the final dissonance taken from arousal/entropy.
    pub pulse_weight: f32,
    /// How far a seen feature's weight moves toward 1 per call.
    pub cloud_blend: f32,
    /// Multiplicative decay for features absent from the input.
    pub cloud_decay: f32,
    /// Half-width of the uniform jitter added to `cloud_decay` each call.
    pub decay_jitter: f32,
}

impl Default for DissonanceConfig {
    fn default() -> Self {
        Self {
            repeat_threshold: 0.6,
            repeat_damping: 0.5,
            boredom_threshold: 2,
            boredom_floor: 0.6,
            boredom_step: 0.1,
            pulse_weight: 0.2,
            cloud_blend: 0.3,
            cloud_decay: 0.95,
            decay_jitter: 0.01,
        }
    }
}

/// Maps dissonance and boredom onto a sampling temperature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureConfig {
    pub min: f32,
    pub max: f32,
    /// Temperature added per unit of dissonance above 0.5.
    pub dissonance_gain: f32,
    /// Temperature added per repeat once boredom has set in.
    pub boredom_gain: f32,
    pub arousal_gain: f32,
    /// The commentator runs this much hotter than the artist.
    pub commentator_bump: f32,
    /// Token budget for the commentator's roast.
    pub commentator_tokens: usize,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            min: 0.3,
            max: 1.5,
            dissonance_gain: 0.4,
            boredom_gain: 0.15,
            arousal_gain: 0.1,
            commentator_bump: 0.2,
            commentator_tokens: 50,
        }
    }
}

/// Everything one `PromptGenerator` needs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub dissonance: DissonanceConfig,
    pub temperature: TemperatureConfig,
}

impl EngineConfig {
    /// Parse from a JSON string. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                YentError::ResourceNotFound(path.display().to_string())
            } else {
                YentError::Io(e)
            }
        })?;
        Self::from_json_str(&data)
    }

    /// Reject values that would break the engine's invariants (weights
    /// leaving [0, 1], an empty temperature band).
    pub fn validate(&self) -> Result<()> {
        let d = &self.dissonance;
        let unit = |name: &str, v: f32| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(YentError::Config(format!("{name} must be in [0, 1], got {v}")))
            }
        };
        unit("repeat_threshold", d.repeat_threshold)?;
        unit("repeat_damping", d.repeat_damping)?;
        unit("boredom_floor", d.boredom_floor)?;
        unit("pulse_weight", d.pulse_weight)?;
        unit("cloud_blend", d.cloud_blend)?;
        unit("cloud_decay", d.cloud_decay)?;
        if d.decay_jitter < 0.0 || d.cloud_decay + d.decay_jitter > 1.0 {
            return Err(YentError::Config(format!(
                "decay_jitter {} pushes cloud_decay {} outside [0, 1]",
                d.decay_jitter, d.cloud_decay
            )));
        }
        let t = &self.temperature;
        if !(t.min > 0.0 && t.min < t.max) {
            return Err(YentError::Config(format!(
                "temperature band [{}, {}] is empty",
                t.min, t.max
            )));
        }
        Ok(())
    }
}
