use std::time::Duration;

/// Limits for outbound decision requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Requests in flight at once, process-wide.
    pub max_in_flight: usize,
    /// Minimum gap between successive dispatches when pacing is on.
    pub min_spacing: Duration,
    /// Retries after the first attempt on a rate-limit response.
    pub max_retries: u32,
    /// Backoff when the provider gives no usable hint.
    pub default_backoff: Duration,
    /// Floor for any backoff, including a provider-claimed zero.
    pub min_backoff: Duration,
    /// Ceiling for any backoff. A waiting retry keeps its permit.
    pub max_backoff: Duration,
    pub pacing_enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 3,
            min_spacing: Duration::from_millis(1500),
            max_retries: 3,
            default_backoff: Duration::from_secs(5),
            min_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            pacing_enabled: true,
        }
    }
}

impl SchedulerConfig {
    /// No dispatch pacing; retry limits unchanged.
    pub fn deterministic() -> Self {
        Self {
            pacing_enabled: false,
            ..Self::default()
        }
    }
}
