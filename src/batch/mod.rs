//! Batch runner: iterates cities, pillars and questions, researches each entity,
//! and writes results to the store in fixed-size chunks.

pub mod buffer;
pub mod error;
pub mod runner;
pub mod types;


pub use buffer::{ChunkBuffer, IntoBatch};
pub use error::{BatchError, BatchResult};
pub use runner::BatchRunner;
pub use types::{
    BatchConfig, DEFAULT_CHUNK_SIZE, DEFAULT_CITY_CONCURRENCY, Entity, EntityId, EntityState,
    RunReport, RunScope, TierCounts, TierSet,
};
