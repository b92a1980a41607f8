use std::time::Duration;

use thiserror::Error;

/// Failures talking to the reasoning engine. None of these are retried by the pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("engine transport error: {0}")]
    Transport(String),

    #[error("engine call timed out after {0:?}")]
    Timeout(Duration),

    #[error("engine returned no text content")]
    EmptyResponse,

    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

/// Convenience result type for engine calls.
pub type EngineResult<T> = Result<T, EngineError>;
