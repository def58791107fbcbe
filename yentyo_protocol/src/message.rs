// Request and response bodies for one interaction.
//
// - `ReactRequest`: user input plus optional sampling overrides. Missing or
//   non-positive overrides fall back to 30 tokens / temperature 0.8;
//   `normalize` applies those defaults and rejects blank input.
// - `ReactResponse`: everything a client shows after an interaction (prompt,
//   bare overlay words, roast, who drew, optional image handle, scoring).
// - `HealthResponse`: version and loaded-model descriptions.
//
// Field names are snake_case JSON keys. `artist_id` is a plain string ("A"
// or "B") so this crate stays independent of `yentyo_core`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ImageId;

pub const YENTYO_VERSION: &str = "2.0";
pub const DEFAULT_MAX_TOKENS: usize = 30;
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("input required")]
    EmptyInput,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactRequest {
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
}

/// A `ReactRequest` with defaults applied.
#[derive(Clone, Debug, PartialEq)]
pub struct ReactParams {
    pub input: String,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl ReactRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn normalize(&self) -> Result<ReactParams, RequestError> {
        self.normalize_with(DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE)
    }

    /// Apply caller-chosen defaults for missing or non-positive overrides.
    pub fn normalize_with(
        &self,
        default_max_tokens: usize,
        default_temperature: f32,
    ) -> Result<ReactParams, RequestError> {
        if self.input.trim().is_empty() {
            return Err(RequestError::EmptyInput);
        }
        let max_tokens = match self.max_tokens {
            Some(n) if n > 0 => n,
            _ => default_max_tokens,
        };
        let temperature = match self.temperature {
            Some(t) if t.is_finite() && t > 0.0 => t,
            _ => default_temperature,
        };
        Ok(ReactParams {
            input: self.input.clone(),
            max_tokens,
            temperature,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReactResponse {
    /// Full diffusion prompt, style suffix included.
    pub prompt: String,
    /// Prompt with the style suffix cut off.
    pub yent_words: String,
    pub roast: String,
    pub artist_id: String,
    /// Set when an image was synthesized and stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<ImageId>,
    pub dissonance: f32,
    pub temperature: f32,
    pub elapsed_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub version: String,
    pub model_a: String,
    pub model_b: String,
    /// Empty when no image pipeline is loaded.
    pub sd_model: String,
    pub ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_apply() {
        let params = ReactRequest::new("hello").normalize().unwrap();
        assert_eq!(params.max_tokens, 30);
        assert_eq!(params.temperature, 0.8);
        assert_eq!(params.input, "hello");
    }

    #[test]
    fn non_positive_overrides_fall_back() {
        let req = ReactRequest {
            input: "hi".into(),
            temperature: Some(-1.0),
            max_tokens: Some(0),
        };
        let params = req.normalize().unwrap();
        assert_eq!((params.max_tokens, params.temperature), (30, 0.8));

        let nan = ReactRequest {
            temperature: Some(f32::NAN),
            ..ReactRequest::new("hi")
        };
        assert_eq!(nan.normalize().unwrap().temperature, 0.8);
    }

    #[test]
    fn explicit_overrides_kept() {
        let req = ReactRequest {
            input: "hi".into(),
            temperature: Some(1.2),
            max_tokens: Some(64),
        };
        let params = req.normalize().unwrap();
        assert_eq!((params.max_tokens, params.temperature), (64, 1.2));
    }

    #[test]
    fn custom_defaults() {
        let params = ReactRequest::new("hi").normalize_with(12, 1.1).unwrap();
        assert_eq!((params.max_tokens, params.temperature), (12, 1.1));
    }

    #[test]
    fn blank_input_rejected() {
        assert_eq!(ReactRequest::new("").normalize(), Err(RequestError::EmptyInput));
        assert_eq!(ReactRequest::new(" \n\t").normalize(), Err(RequestError::EmptyInput));
    }

    #[test]
    fn request_from_minimal_json() {
        let req: ReactRequest = serde_json::from_str(r#"{"input":"draw me a duck"}"#).unwrap();
        assert_eq!(req, ReactRequest::new("draw me a duck"));
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"input":"draw me a duck"}"#);
    }

    #[test]
    fn response_json_keys() {
        let resp = ReactResponse {
            prompt: "a mirror cracking, surreal".into(),
            yent_words: "a mirror cracking".into(),
            roast: "you fool".into(),
            artist_id: "B".into(),
            image_id: None,
            dissonance: 0.75,
            temperature: 0.5,
            elapsed_ms: 42,
        };
        let value: serde_json::Value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["yent_words"], "a mirror cracking");
        assert_eq!(value["artist_id"], "B");
        assert_eq!(value["elapsed_ms"], 42);
        assert!(value.get("image_id").is_none());

        let with_image = ReactResponse {
            image_id: Some(ImageId(3)),
            ..resp
        };
        let back: ReactResponse =
            serde_json::from_str(&serde_json::to_string(&with_image).unwrap()).unwrap();
        assert_eq!(back, with_image);
    }

    #[test]
    fn health_fields() {
        let health = HealthResponse {
            version: YENTYO_VERSION.into(),
            model_a: "12 layers, 512 dim".into(),
            model_b: "12 layers, 384 dim".into(),
            sd_model: "bk-sdm-tiny".into(),
            ready: true,
        };
        let value = serde_json::to_value(&health).unwrap();
        assert_eq!(value["version"], "2.0");
        assert_eq!(value["ready"], true);
        assert_eq!(value["sd_model"], "bk-sdm-tiny");
    }
}
