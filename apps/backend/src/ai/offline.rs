use async_trait::async_trait;

use super::trait_def::{Prompt, ProviderError, TextGenerator};

/// Generator used when no provider is configured.
///
/// Every call fails without retry, so each decision takes the random
/// fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _prompt: &Prompt) -> Result<String, ProviderError> {
        Err(ProviderError::Other("no text-generation provider configured".into()))
    }
}
