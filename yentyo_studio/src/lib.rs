// yentyo_studio — the reacting artist, end to end.
//
// Ties the text side (`yentyo_core`), image synthesis (`yentyo_diffusion`)
// and artifact disguise (`yentyo_postprocess`) into one serialized
// interaction, speaking the `yentyo_protocol` request/response types. Model
// backends are injected as trait objects; this crate loads nothing from disk
// except its own JSON config.
//
// Module overview:
// - `config.rs`: `StudioConfig`, one document aggregating every crate's
//                tunables plus request defaults and sampling settings.
// - `error.rs`:  `StudioError`, wrapping each stage's error type.
// - `studio.rs`: `Studio` (react / image / health), `ImageModels` (the
//                external encoder/denoiser/decoder), `ImagePipeline` built
//                from the config around them, and the bounded image store.

pub mod config;
pub mod error;
pub mod studio;

pub use config::StudioConfig;
pub use error::{Result, StudioError};
pub use studio::{ImageModels, ImagePipeline, Studio};
