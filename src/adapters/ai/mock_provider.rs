//! Scripted stand-in for the Gemini adapter.
//!
//! Replies and failures are played back in the order they were queued; once
//! the queue runs dry every call gets [`DEFAULT_REPLY`]. Each request is kept
//! so tests can inspect the prompt that would have gone to the model.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Reply used when nothing is queued.
pub const DEFAULT_REPLY: &str = "Happy to help with that.";

#[derive(Debug, Clone, Default)]
pub struct MockAIProvider {
    queued: Arc<Mutex<VecDeque<Result<String, AIError>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        lock(&self.queued).push_back(Ok(text.into()));
        self
    }

    /// Queues a failure, e.g. to drive the fallback path.
    pub fn with_error(self, error: AIError) -> Self {
        lock(&self.queued).push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        lock(&self.requests).push(request);

        let next = lock(&self.queued).pop_front();
        let content = next.unwrap_or_else(|| Ok(DEFAULT_REPLY.to_string()))?;
        Ok(CompletionResponse {
            content,
            usage: TokenUsage::new(0, 0),
            model: self.provider_info().model,
            finish_reason: FinishReason::Stop,
        })
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "gemini-mock")
    }
}
