//! Fixed-delay retry for rate-limited providers.

use crate::{Provider, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Wraps a provider and retries calls that fail with a rate limit.
///
/// Other errors are returned immediately. After `max_retries` retries the
/// last rate-limit error is returned.
pub struct RetryingProvider {
    inner: Arc<dyn Provider>,
    max_retries: u32,
    delay: Duration,
}

impl RetryingProvider {
    /// Create a retrying wrapper.
    pub fn new(inner: Arc<dyn Provider>, max_retries: u32, delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            delay,
        }
    }
}

#[async_trait]
impl Provider for RetryingProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.inner.complete(prompt).await {
                Err(e) if e.is_rate_limit() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "Rate limit hit. Retrying in {} ms (attempt {}/{})",
                        self.delay.as_millis(),
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(self.delay).await;
                }
                result => return result,
            }
        }
    }
}
