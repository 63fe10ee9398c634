//! Text-generation provider trait definition.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppError;

/// Errors a provider call can end in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Throughput limit hit. Worth retrying after a delay.
    RateLimited {
        /// Structured hint, e.g. from a `retry-after` header.
        retry_after: Option<Duration>,
        /// Free text from the provider; may embed a delay hint of its own.
        message: String,
    },
    /// Anything else. Never retried.
    Other(String),
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::RateLimited { message, .. } => write!(f, "rate limited: {message}"),
            ProviderError::Other(msg) => write!(f, "provider error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::provider(err.to_string())
    }
}

/// A single request to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Standing instructions: role, personality, output format.
    pub system: String,
    /// The game context and the concrete question.
    pub user: String,
}

/// Source of free-text replies for computer players.
///
/// Implementations do a single attempt; retries and pacing belong to the
/// [`RequestScheduler`](super::scheduler::RequestScheduler).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError>;
}
