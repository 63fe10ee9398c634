//! One-shot timers for phase deadlines.
//!
//! Phase transitions cancel whatever timers the previous phase left behind,
//! so every scheduled callback hands back a [`TimerHandle`]. The tokio
//! implementation works on tokio's clock, which tests pause and advance.

use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

/// Schedules a future to run once after `delay`, unless cancelled first.
pub trait TimerScheduler: Send + Sync {
    fn schedule_once(&self, delay: Duration, task: BoxFuture<'static, ()>) -> TimerHandle;
}

/// Cancellable reference to a pending timer.
///
/// Cancelling is idempotent and a no-op once the callback has started.
#[derive(Clone)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

/// Timers backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTimers;

impl TimerScheduler for TokioTimers {
    fn schedule_once(&self, delay: Duration, task: BoxFuture<'static, ()>) -> TimerHandle {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => task.await,
            }
        });
        TimerHandle::new(token)
    }
}
