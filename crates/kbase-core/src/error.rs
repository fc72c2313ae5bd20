use std::fmt;

use thiserror::Error;

/// External collaborator whose call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Embedding,
    VectorIndex,
    Generation,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Embedding => "embedding service",
            Service::VectorIndex => "vector index",
            Service::Generation => "generation service",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    MalformedInput(String),

    #[error("{service} unavailable: {message}")]
    ExternalService { service: Service, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn external(service: Service, message: impl fmt::Display) -> Self {
        Error::ExternalService { service, message: message.to_string() }
    }

    /// True when the failure came from a backend rather than from the caller.
    pub fn is_external(&self) -> bool {
        matches!(self, Error::ExternalService { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
