//! Backoff delay for rate-limited provider calls.

use std::time::Duration;

use lazy_regex::regex_captures;

use super::trait_def::ProviderError;
use crate::config::SchedulerConfig;

/// Delay before retrying `err`.
///
/// Preference order: the structured `retry_after`, then a delay found in the
/// message text, then the configured default. The result is clamped to
/// `min_backoff..=max_backoff`.
pub fn backoff_for(err: &ProviderError, cfg: &SchedulerConfig) -> Duration {
    let hinted = match err {
        ProviderError::RateLimited {
            retry_after: Some(after),
            ..
        } => Some(*after),
        ProviderError::RateLimited { message, .. } => parse_delay(message),
        ProviderError::Other(_) => None,
    };
    hinted
        .unwrap_or(cfg.default_backoff)
        .max(cfg.min_backoff)
        .min(cfg.max_backoff)
}

/// Find a delay like "try again in 2.5s", "retry after 300ms" or
/// "retry in 20 seconds" in provider text.
pub fn parse_delay(message: &str) -> Option<Duration> {
    let (_, amount, unit) = regex_captures!(
        r"(?i)(?:try again|retry)(?: after| in)?\s+(\d+(?:\.\d+)?)\s*(ms|milliseconds?|s|secs?|seconds?)\b",
        message
    )?;
    let amount: f64 = amount.parse().ok()?;
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    let secs = if unit.eq_ignore_ascii_case("ms") || unit.to_ascii_lowercase().starts_with("milli") {
        amount / 1000.0
    } else {
        amount
    };
    Duration::try_from_secs_f64(secs).ok()
}
