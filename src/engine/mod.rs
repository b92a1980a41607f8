//! Reasoning engine boundary.
//!
//! The pipeline only needs `invoke(prompt) -> text`. [`GenaiEngine`] talks to a hosted
//! or local model through `genai`; [`MockEngine`] replays scripted responses in tests.

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

pub use client::{EngineSettings, GenaiEngine};
pub use error::{EngineError, EngineResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEngine;

use async_trait::async_trait;
use serde::Serialize;

/// A rendered system + user message pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Returns `true` if either message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.system.contains(needle) || self.user.contains(needle)
    }
}

/// Text-completion service the pipeline prompts for verdicts.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Sends `prompt` and returns the raw completion text.
    async fn invoke(&self, prompt: &Prompt) -> EngineResult<String>;

    /// Identifier used in logs.
    fn name(&self) -> &str;
}
