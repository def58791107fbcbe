// Errors for image synthesis.
//
// Shape and step-count problems are structural: they abort the current
// request only. Failures inside the external models are wrapped with the
// stage that produced them.

use thiserror::Error;

/// Boxed error returned by external model implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum DiffusionError {
    #[error("bad tensor shape: {0}")]
    Shape(String),
    #[error("cannot sample {requested} steps from a {available}-step schedule")]
    InvalidSteps { requested: usize, available: usize },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("text encoder failed: {0}")]
    Encoder(#[source] BoxError),
    #[error("denoiser failed at timestep {timestep}: {source}")]
    Denoiser {
        timestep: usize,
        #[source]
        source: BoxError,
    },
    #[error("latent decoder failed: {0}")]
    Decoder(#[source] BoxError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DiffusionError>;
