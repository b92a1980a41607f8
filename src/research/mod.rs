//! Retry controller and the question, pillar and city orchestrators.

pub mod error;
pub mod orchestrator;
pub mod retry;
pub mod types;


pub use error::{ResearchError, ResearchResult};
pub use orchestrator::Researcher;
pub use retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryController, RetryPolicy, interpret};
pub use types::{
    CityTask, EvaluatorBaseline, PillarRecord, PillarTask, QuestionTask, current_year,
    discrepancy,
};
