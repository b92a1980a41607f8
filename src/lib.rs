//! Veridian library crate (used by the server binary and integration tests).
//!
//! Researches urban-governance evidence with an LLM engine and scores it on a
//! three-tier hierarchy: questions roll up into pillars, pillars into a city.
//!
//! ## Pipeline
//! - [`response`] - pull the JSON document out of raw engine text
//! - [`validation`] - schema checks, sanitisation and trust inference per tier
//! - [`engine`] - the [`ReasoningEngine`] seam and its genai client
//! - [`prompts`] - prompt templates and pillar guidance
//! - [`research`] - retry controller and per-tier orchestrators
//!
//! ## Persistence and runs
//! - [`store`] - the [`EvaluationStore`] seam, SQLite adapter and schema
//! - [`batch`] - chunked bulk runs across cities
//! - [`supervisor`] - background runs tracked by [`RunId`]
//! - [`gateway`] - HTTP surface
//!
//! ## Test/Mock Support
//! [`MockEngine`] and [`MemoryStore`] are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod batch;
pub mod config;
pub mod engine;
pub mod gateway;
pub mod prompts;
pub mod research;
pub mod response;
pub mod store;
pub mod supervisor;
pub mod validation;

pub use batch::{BatchConfig, BatchError, BatchRunner, RunReport, RunScope, TierSet};
pub use config::{Config, ConfigError};
#[cfg(any(test, feature = "mock"))]
pub use engine::MockEngine;
pub use engine::{EngineError, EngineSettings, GenaiEngine, Prompt, ReasoningEngine};
pub use research::{
    CityTask, PillarRecord, PillarTask, QuestionTask, ResearchError, Researcher, RetryController,
    RetryPolicy,
};
#[cfg(any(test, feature = "mock"))]
pub use store::MemoryStore;
pub use store::{EvaluationStore, SqliteStore, StoreError};
pub use supervisor::{RunId, RunStatus, RunSupervisor};
pub use validation::{SchemaViolation, Tier, TierResult};
