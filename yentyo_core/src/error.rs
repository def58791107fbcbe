// Error taxonomy for the text side of the pipeline.
//
// Configuration and resource errors are construction-time and fatal.
// Generation errors abort one interaction only; the orchestrator never
// returns a half-formed result. Numeric degeneracies (empty input, empty
// cloud) are not errors at all, they have defined fallback values in
// `dissonance.rs`.

use std::fmt;

use thiserror::Error;

/// Boxed error returned by external text generators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which part a generator played when it failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Artist,
    Commentator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Artist => write!(f, "artist"),
            Role::Commentator => write!(f, "commentator"),
        }
    }
}

#[derive(Debug, Error)]
pub enum YentError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("{role} generation failed: {source}")]
    Generation {
        role: Role,
        #[source]
        source: BoxError,
    },
    #[error("resource not found: {0}")]
    ResourceNotFound(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, YentError>;
