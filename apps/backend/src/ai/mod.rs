//! Computer player module - provider-backed decisions with a random fallback.
//!
//! This module provides:
//! - the provider trait and its implementations (chat completions, offline)
//! - RequestScheduler: process-wide concurrency, pacing and retry
//! - DecisionAgent: prompts, reply parsing and the fallback policy

pub mod agent;
pub mod backoff;
pub mod chat_client;
pub mod offline;
pub mod parse;
pub mod prompt;
mod random;
pub mod scheduler;
mod trait_def;

use std::sync::Arc;

pub use agent::{Choice, ChoiceSource, DecisionAgent};
pub use chat_client::ChatCompletionsClient;
pub use offline::OfflineGenerator;
pub use prompt::Decision;
pub use random::RandomChooser;
pub use scheduler::{DispatchOutcome, RequestScheduler};
pub use trait_def::{Prompt, ProviderError, TextGenerator};

use crate::config::ProviderConfig;
use crate::error::AppError;

/// Provider from configuration: a chat completions client when an API key
/// is set, otherwise the offline generator.
pub fn create_generator(config: Option<ProviderConfig>) -> Result<Arc<dyn TextGenerator>, AppError> {
    match config {
        Some(cfg) => Ok(Arc::new(ChatCompletionsClient::new(cfg)?)),
        None => Ok(Arc::new(OfflineGenerator)),
    }
}
