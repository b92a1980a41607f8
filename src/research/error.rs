use thiserror::Error;

use crate::engine::EngineError;
use crate::response::AttemptError;
use crate::validation::Tier;

#[derive(Debug, Error)]
pub enum ResearchError {
    /// The engine itself failed; never retried.
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("no valid response after {attempts} attempts: {last}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        last: AttemptError,
    },

    #[error("expected a {expected} result, got {found}")]
    TierMismatch { expected: Tier, found: Tier },
}

impl ResearchError {
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, ResearchError::Engine(_))
    }
}

pub type ResearchResult<T> = Result<T, ResearchError>;
