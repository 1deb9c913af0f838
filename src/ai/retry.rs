//! Retry and Rate-Limit Pacing
//!
//! Wraps any chat provider with request spacing and category-aware retry.
//! Consecutive requests are kept at least `min_request_interval` apart, and
//! retryable failures back off exponentially with random jitter up to a
//! capped delay. Permanent failures (auth, bad request) surface immediately.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::provider::{ChatMessage, ChatProvider, SharedProvider};
use crate::constants::retry as retry_constants;
use crate::types::{BlizzardError, ErrorCategory, ErrorClassifier, LlmError, Result};

/// Retry and pacing parameters
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts per request (first try included)
    pub max_attempts: u32,
    /// Base delay for exponential backoff
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_factor: f32,
    /// Minimum spacing between consecutive requests
    pub min_request_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: retry_constants::MAX_ATTEMPTS,
            base_delay: Duration::from_millis(retry_constants::BASE_DELAY_MS),
            max_delay: Duration::from_secs(retry_constants::MAX_DELAY_SECS),
            backoff_factor: retry_constants::BACKOFF_FACTOR,
            min_request_interval: Duration::from_millis(
                retry_constants::MIN_REQUEST_INTERVAL_MS,
            ),
        }
    }
}

/// Chat provider wrapper enforcing pacing and retry
pub struct RetryingProvider {
    inner: SharedProvider,
    policy: RetryPolicy,
    /// Completion time of the most recent request, for interval spacing
    last_request: Mutex<Option<Instant>>,
}

impl RetryingProvider {
    pub fn new(inner: SharedProvider, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            last_request: Mutex::new(None),
        }
    }

    /// Sleep until at least `min_request_interval` has passed since the
    /// previous request. The lock is held across the wait so concurrent
    /// callers are serialized onto the same pace.
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.policy.min_request_interval {
                let wait = self.policy.min_request_interval - elapsed;
                debug!(wait_ms = wait.as_millis(), "Pacing before next request");
                sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    fn classify(&self, error: &BlizzardError) -> LlmError {
        match error {
            BlizzardError::Llm(inner) => inner.clone(),
            other => ErrorClassifier::classify(&other.to_string(), self.inner.name()),
        }
    }
}

#[async_trait]
impl ChatProvider for RetryingProvider {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let mut current_delay = self.policy.base_delay;
        let mut last_error = None;

        for attempt in 1..=self.policy.max_attempts {
            self.pace().await;

            match self.inner.chat(messages).await {
                Ok(content) => return Ok(content),
                Err(error) => {
                    let classified = self.classify(&error);

                    if !classified.is_retryable() {
                        warn!(
                            provider = self.inner.name(),
                            category = %classified.category,
                            "Permanent provider failure"
                        );
                        return Err(BlizzardError::Llm(classified));
                    }

                    if attempt == self.policy.max_attempts {
                        last_error = Some(classified);
                        break;
                    }

                    // Rate limits wait out their suggested (or category
                    // default) delay; other retryable failures follow the
                    // exponential schedule.
                    let wait = if classified.category == ErrorCategory::RateLimit {
                        classified.recommended_delay()
                    } else {
                        classified
                            .retry_after
                            .unwrap_or(current_delay + random_jitter(current_delay))
                    };
                    warn!(
                        provider = self.inner.name(),
                        attempt,
                        category = %classified.category,
                        wait_ms = wait.as_millis(),
                        "Retrying after provider failure"
                    );
                    sleep(wait).await;
                    current_delay = calculate_backoff(
                        current_delay,
                        self.policy.backoff_factor,
                        self.policy.max_delay,
                    );
                    last_error = Some(classified);
                }
            }
        }

        Err(BlizzardError::Llm(last_error.unwrap_or_else(|| {
            ErrorClassifier::classify("retries exhausted", self.inner.name())
        })))
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn health_check(&self) -> Result<bool> {
        self.inner.health_check().await
    }
}

/// Random jitter up to 25% of the base delay
fn random_jitter(base_delay: Duration) -> Duration {
    let max_jitter_ms = (base_delay.as_millis() as u64) / 4;
    if max_jitter_ms == 0 {
        return Duration::ZERO;
    }
    let jitter_ms = rand::rng().random_range(0..max_jitter_ms);
    Duration::from_millis(jitter_ms)
}

/// Calculate exponential backoff with cap
fn calculate_backoff(current: Duration, factor: f32, max: Duration) -> Duration {
    let next = Duration::from_secs_f32(current.as_secs_f32() * factor);
    std::cmp::min(next, max)
}
