// yentyo_protocol — request/response vocabulary for yent.yo.
//
// Plain serde types for one interaction and the health probe, shared by the
// studio and any transport layered on top of it. No transport lives here and
// nothing depends on the model crates.
//
// Module overview:
// - `types.rs`:   `ImageId`.
// - `message.rs`: `ReactRequest` (+ normalization into `ReactParams`),
//                 `ReactResponse`, `HealthResponse`, `RequestError`.

pub mod message;
pub mod types;

pub use message::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, HealthResponse, ReactParams, ReactRequest,
    ReactResponse, RequestError, YENTYO_VERSION,
};
pub use types::ImageId;
