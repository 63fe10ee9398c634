use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::ai::{Prompt, ProviderError, TextGenerator};

/// Generator that replays a fixed script of replies.
///
/// Once the script runs out every call gets `otherwise`. Prompts are kept
/// so tests can assert on what a computer player was shown.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    otherwise: Result<String, ProviderError>,
    prompts: Mutex<Vec<Prompt>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(
        script: impl IntoIterator<Item = Result<String, ProviderError>>,
        otherwise: Result<String, ProviderError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            otherwise,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Reply with `replies` in order, then fail without retry.
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            replies.into_iter().map(|r| Ok(r.into())),
            Err(ProviderError::Other("script exhausted".into())),
        )
    }

    /// Reply `reply` to every call.
    pub fn always(reply: impl Into<String>) -> Self {
        Self::new(Vec::new(), Ok(reply.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.clone());
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| self.otherwise.clone())
    }
}
