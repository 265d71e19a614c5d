//! Bounded fixed-interval retry for flaky remote reads

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::error::E2eResult;
use crate::transport::HttpResponse;

/// Decides whether an attempt's result ends the retry loop
pub trait RetryOutcome {
    fn succeeded(&self) -> bool;
}

impl RetryOutcome for HttpResponse {
    fn succeeded(&self) -> bool {
        self.is_success()
    }
}

impl RetryOutcome for bool {
    fn succeeded(&self) -> bool {
        *self
    }
}

/// Run `op` until it yields a successful outcome or `max_attempts` is spent.
///
/// Errors count as failed attempts. The interval is slept between attempts
/// only. When the budget runs out the last result is returned as is, so the
/// caller inspects its success indicator itself.
pub async fn retry<T, F, Fut>(mut op: F, interval: Duration, max_attempts: u32) -> E2eResult<T>
where
    T: RetryOutcome,
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let result = op().await;
        let done = matches!(&result, Ok(value) if value.succeeded());

        if done {
            if attempt > 1 {
                debug!("Succeeded on attempt {}/{}", attempt, max_attempts);
            }
            return result;
        }

        if attempt >= max_attempts {
            warn!("Giving up after {} attempt(s)", attempt);
            return result;
        }

        match &result {
            Ok(_) => debug!("Attempt {}/{} unsuccessful, retrying", attempt, max_attempts),
            Err(e) => debug!("Attempt {}/{} failed: {}, retrying", attempt, max_attempts, e),
        }

        tokio::time::sleep(interval).await;
        attempt += 1;
    }
}

/// [`retry`] with the interval and budget taken from configuration
pub async fn retry_with<T, F, Fut>(config: &RetryConfig, op: F) -> E2eResult<T>
where
    T: RetryOutcome,
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    retry(op, config.interval(), config.max_attempts).await
}
