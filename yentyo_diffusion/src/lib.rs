// yentyo_diffusion — the image-synthesis half of the yent.yo pipeline.
//
// The artist's prompt becomes an image here: a DDIM scheduler subsamples the
// training noise schedule, an external denoiser predicts noise at each
// chosen timestep, and the deterministic recombination, latent
// initialization and tensor/image conversions are owned by this crate.
//
// Module overview:
// - `tensor.rs`:    flat `f32` tensor with a small-vector shape (NCHW).
// - `scheduler.rs`: `DdimScheduler` (linear betas, cumulative alphas,
//                   `set_timesteps`, per-step `StepCoefficients`).
// - `latent.rs`:    seeded Gaussian latent initialization.
// - `bridge.rs`:    tensor <-> RGBA conversion, corner-aligned bilinear
//                   resampling, RGBA resize.
// - `pipeline.rs`:  `TextEncoder` / `Denoiser` / `LatentDecoder` traits and
//                   the `Synthesizer` loop with classifier-free guidance.
// - `config.rs`:    `SchedulerConfig`, `SynthesisConfig`.
// - `error.rs`:     `DiffusionError` and the crate `Result`.

pub mod bridge;
pub mod config;
pub mod error;
pub mod latent;
pub mod pipeline;
pub mod scheduler;
pub mod tensor;

pub use bridge::{
    ResizeFilter, bilinear_upscale, clamp_byte, clamp8, float32_to_rgba, resize_rgba,
    rgba_to_tensor, tensor_to_rgba,
};
pub use config::{SchedulerConfig, SynthesisConfig};
pub use error::{BoxError, DiffusionError, Result};
pub use latent::random_latent;
pub use pipeline::{Denoiser, LatentDecoder, Synthesizer, TextEncoder};
pub use scheduler::{DdimScheduler, StepCoefficients};
pub use tensor::{Shape, Tensor};
