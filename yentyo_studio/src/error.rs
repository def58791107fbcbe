// Studio errors: everything that can end one interaction.
//
// Errors from the text, diffusion and post-processing crates pass through
// unchanged via `#[from]`. A failed interaction leaves the studio usable;
// only a poisoned lock (a panic inside a previous interaction) is sticky.

use thiserror::Error;
use yentyo_core::YentError;
use yentyo_diffusion::DiffusionError;
use yentyo_postprocess::PostProcessError;
use yentyo_protocol::{ImageId, RequestError};

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("bad request: {0}")]
    BadRequest(#[from] RequestError),
    #[error(transparent)]
    Core(#[from] YentError),
    #[error(transparent)]
    Diffusion(#[from] DiffusionError),
    #[error(transparent)]
    PostProcess(#[from] PostProcessError),
    #[error("image {0} not found")]
    ImageNotFound(ImageId),
    #[error("studio lock poisoned by an earlier panic")]
    Poisoned,
    #[error("invalid studio configuration: {0}")]
    Config(String),
    #[error("resource not found: {0}")]
    ResourceNotFound(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StudioError>;
