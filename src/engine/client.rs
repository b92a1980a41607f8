use std::time::Duration;

use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::{debug, instrument};

use super::error::{EngineError, EngineResult};
use super::{Prompt, ReasoningEngine};

/// Model and sampling parameters for [`GenaiEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Model identifier; genai picks the provider adapter from it.
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Upper bound on a single call.
    pub timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_tokens: 2000,
            timeout: Duration::from_secs(300),
        }
    }
}

/// [`ReasoningEngine`] backed by a `genai` client.
#[derive(Clone)]
pub struct GenaiEngine {
    client: Client,
    settings: EngineSettings,
    options: ChatOptions,
}

impl GenaiEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_client(Client::default(), settings)
    }

    pub fn with_client(client: Client, settings: EngineSettings) -> Self {
        let options = ChatOptions::default()
            .with_temperature(settings.temperature)
            .with_max_tokens(settings.max_tokens);
        Self {
            client,
            settings,
            options,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

#[async_trait]
impl ReasoningEngine for GenaiEngine {
    #[instrument(skip_all, fields(model = %self.settings.model))]
    async fn invoke(&self, prompt: &Prompt) -> EngineResult<String> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(prompt.system.clone()),
            ChatMessage::user(prompt.user.clone()),
        ]);

        let call = self
            .client
            .exec_chat(&self.settings.model, request, Some(&self.options));

        let response = tokio::time::timeout(self.settings.timeout, call)
            .await
            .map_err(|_| EngineError::Timeout(self.settings.timeout))?
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let text = response
            .first_text()
            .map(str::to_string)
            .filter(|t| !t.trim().is_empty())
            .ok_or(EngineError::EmptyResponse)?;

        debug!(chars = text.len(), "engine responded");
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.settings.model
    }
}
