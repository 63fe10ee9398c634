//! Bounded, paced, retrying dispatcher for provider requests.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Semaphore};
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, warn};

use super::backoff::backoff_for;
use super::trait_def::ProviderError;
use crate::config::SchedulerConfig;

/// How a submitted task ended. Never an `Err`: callers always get
/// something they can fall back from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome<T> {
    Completed(T),
    /// Non-retryable provider error, surfaced after a single call.
    Failed(ProviderError),
    /// Still rate limited after the retry ceiling.
    Exhausted { attempts: u32 },
}

impl<T> DispatchOutcome<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            DispatchOutcome::Completed(value) => Some(value),
            DispatchOutcome::Failed(_) | DispatchOutcome::Exhausted { .. } => None,
        }
    }
}

/// Process-wide gate in front of the text-generation provider.
///
/// - at most `max_in_flight` tasks run at once; waiters are served FIFO
///   (tokio's semaphore is fair)
/// - successive dispatches are spaced by `min_spacing` when pacing is on
/// - rate-limited attempts are retried in place, keeping their slot
pub struct RequestScheduler {
    config: SchedulerConfig,
    permits: Semaphore,
    last_dispatch: Mutex<Option<Instant>>,
    dispatched: AtomicU64,
}

impl RequestScheduler {
    pub fn new(config: SchedulerConfig) -> Arc<Self> {
        let permits = Semaphore::new(config.max_in_flight.max(1));
        Arc::new(Self {
            config,
            permits,
            last_dispatch: Mutex::new(None),
            dispatched: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Underlying calls made so far, retries included.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Run `task` under the concurrency, pacing and retry policy.
    ///
    /// `task` is called once per attempt.
    pub async fn submit<F, Fut, T>(&self, label: &str, mut task: F) -> DispatchOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => return DispatchOutcome::Failed(ProviderError::Other("scheduler closed".into())),
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            self.pace().await;
            self.dispatched.fetch_add(1, Ordering::Relaxed);

            match task().await {
                Ok(value) => {
                    debug!(label, attempt, "provider request completed");
                    return DispatchOutcome::Completed(value);
                }
                Err(err) if err.is_rate_limited() => {
                    if attempt > self.config.max_retries {
                        warn!(label, attempt, "provider still rate limited, giving up");
                        return DispatchOutcome::Exhausted { attempts: attempt };
                    }
                    let delay = backoff_for(&err, &self.config);
                    warn!(
                        label,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "provider rate limited, retrying"
                    );
                    sleep(delay).await;
                }
                Err(err) => {
                    warn!(label, attempt, error = %err, "provider request failed");
                    return DispatchOutcome::Failed(err);
                }
            }
        }
    }

    /// Wait until `min_spacing` has passed since the previous dispatch.
    async fn pace(&self) {
        if !self.config.pacing_enabled {
            return;
        }
        let mut last = self.last_dispatch.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.config.min_spacing;
            if Instant::now() < ready_at {
                sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}
