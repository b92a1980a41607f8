use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::error::{ResearchError, ResearchResult};
use crate::engine::{Prompt, ReasoningEngine};
use crate::response::{AttemptError, parse_object};
use crate::validation::{Tier, TierResult, validate};

/// Default number of engine invocations per entity.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default fixed pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Bounded, fixed-delay retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Invokes the engine until it yields a schema-valid result for a tier.
///
/// Each attempt re-invokes the engine. Extraction, decode and schema failures are
/// retried after [`RetryPolicy::delay`]; engine failures return immediately.
#[derive(Clone)]
pub struct RetryController {
    engine: Arc<dyn ReasoningEngine>,
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(engine: Arc<dyn ReasoningEngine>, policy: RetryPolicy) -> Self {
        Self { engine, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn engine(&self) -> &Arc<dyn ReasoningEngine> {
        &self.engine
    }

    pub async fn run_with_retries(
        &self,
        prompt: &Prompt,
        tier: Tier,
    ) -> ResearchResult<TierResult> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(%tier, attempt, engine = self.engine.name(), "invoking engine");

            let raw = self.engine.invoke(prompt).await?;

            let err = match interpret(&raw, tier) {
                Ok(result) => {
                    if attempt > 1 {
                        info!(%tier, attempt, "valid response after retry");
                    }
                    return Ok(result);
                }
                Err(err) => err,
            };

            if attempt >= max_attempts {
                warn!(%tier, attempt, kind = err.kind(), error = %err, "retries exhausted");
                return Err(ResearchError::ExhaustedRetries {
                    attempts: attempt,
                    last: err,
                });
            }

            warn!(%tier, attempt, kind = err.kind(), error = %err, "invalid response, retrying");
            tokio::time::sleep(self.policy.delay).await;
        }
    }
}

/// Extracts, parses and validates one raw engine response.
pub fn interpret(raw: &str, tier: Tier) -> Result<TierResult, AttemptError> {
    let payload = parse_object(raw)?;
    Ok(validate(tier, &payload)?)
}
