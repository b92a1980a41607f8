use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{EngineError, EngineResult};
use super::{Prompt, ReasoningEngine};

type Responder = dyn Fn(&Prompt) -> EngineResult<String> + Send + Sync;

/// Scripted [`ReasoningEngine`] for tests.
///
/// Responses are served from a queue first; once it is empty the responder (if any)
/// answers, otherwise the call fails with [`EngineError::Unavailable`].
pub struct MockEngine {
    script: Mutex<VecDeque<EngineResult<String>>>,
    responder: Option<Arc<Responder>>,
    prompts: Mutex<Vec<Prompt>>,
    calls: AtomicUsize,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            responder: None,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Engine that replays `responses` in order.
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let engine = Self::new();
        for response in responses {
            engine.push_ok(response);
        }
        engine
    }

    /// Engine that answers every prompt with `f`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Prompt) -> EngineResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Arc::new(f)),
            ..Self::new()
        }
    }

    pub fn push_ok(&self, response: impl Into<String>) {
        self.script.lock().push_back(Ok(response.into()));
    }

    pub fn push_err(&self, error: EngineError) {
        self.script.lock().push_back(Err(error));
    }

    /// Number of `invoke` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt received, in call order.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl ReasoningEngine for MockEngine {
    async fn invoke(&self, prompt: &Prompt) -> EngineResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.clone());

        if let Some(next) = self.script.lock().pop_front() {
            return next;
        }

        match &self.responder {
            Some(responder) => responder(prompt),
            None => Err(EngineError::Unavailable("mock script exhausted".to_string())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
