//! Magpie LLM Provider Layer
//!
//! The transport half of LLM-backed extraction: a pluggable completion
//! provider, an explicit retry policy, and the OpenRouter-compatible
//! client used in production.
//!
//! # Architecture
//!
//! - [`CompletionProvider`]: the seam the extractor depends on
//! - [`OpenRouterProvider`]: chat-completions client (JSON response format,
//!   low temperature, fixed timeout)
//! - [`RetryPolicy`]: bounded attempts with clamped exponential backoff and
//!   a rate-limit cooldown, applied around — not inside — the provider
//! - [`MockProvider`]: deterministic provider for tests
//!
//! # Examples
//!
//! ```
//! use magpie_llm::{CompletionProvider, MockProvider};
//!
//! # async fn example() {
//! let provider = MockProvider::new(r#"{"title": "crash"}"#);
//! let out = provider.complete("system", "user").await.unwrap();
//! assert!(out.contains("crash"));
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod openrouter;
mod retry;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use config::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use openrouter::OpenRouterProvider;
pub use retry::{RetryPolicy, RATE_LIMIT_COOLDOWN_SECS};

/// Errors that can occur talking to a model provider
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    /// Network or connection failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// The request hit its fixed timeout
    #[error("Request timed out")]
    Timeout,

    /// HTTP 429 from the upstream
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Any other non-success HTTP status
    #[error("Upstream returned HTTP {status}: {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// The transport envelope was not decodable JSON
    #[error("Could not decode response envelope: {0}")]
    Decode(String),

    /// The envelope decoded but did not carry the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether a retry might help.
    ///
    /// Network failures, timeouts, rate limits, envelope-decode failures
    /// and 5xx responses are transient; a well-formed 4xx or a
    /// wrong-shaped success is not.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Communication(_)
            | LlmError::Timeout
            | LlmError::RateLimited
            | LlmError::Decode(_) => true,
            LlmError::Upstream { status, .. } => *status >= 500,
            LlmError::InvalidResponse(_) => false,
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Communication(err.to_string())
        }
    }
}

/// A chat-completion backend
///
/// One call, one completion: the provider takes a system prompt and a user
/// prompt and returns the model's text. Retries live outside this trait in
/// [`RetryPolicy`].
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request one completion
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

/// Deterministic provider for tests
///
/// Returns scripted responses in order, then falls back to a fixed default
/// response. No network involved.
///
/// # Examples
///
/// ```
/// use magpie_llm::{CompletionProvider, MockProvider, LlmError};
///
/// # async fn example() {
/// let provider = MockProvider::new("default");
/// provider.push(Err(LlmError::Timeout));
/// provider.push(Ok("second".to_string()));
///
/// assert!(provider.complete("s", "u").await.is_err());
/// assert_eq!(provider.complete("s", "u").await.unwrap(), "second");
/// assert_eq!(provider.complete("s", "u").await.unwrap(), "default");
/// assert_eq!(provider.call_count(), 3);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    script: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockProvider {
    /// Create a provider that answers every call with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue one scripted result, consumed before the default response
    pub fn push(&self, result: Result<String, LlmError>) {
        self.script.lock().unwrap().push_back(result);
    }

    /// Number of completions requested so far
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        *self.call_count.lock().unwrap() += 1;
        if let Some(scripted) = self.script.lock().unwrap().pop_front() {
            return scripted;
        }
        Ok(self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default_response() {
        let provider = MockProvider::new("fixed");
        assert_eq!(provider.complete("s", "u").await.unwrap(), "fixed");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_script_order() {
        let provider = MockProvider::new("default");
        provider.push(Ok("first".to_string()));
        provider.push(Err(LlmError::RateLimited));

        assert_eq!(provider.complete("s", "u").await.unwrap(), "first");
        assert!(matches!(
            provider.complete("s", "u").await,
            Err(LlmError::RateLimited)
        ));
        assert_eq!(provider.complete("s", "u").await.unwrap(), "default");
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider = MockProvider::new("x");
        let clone = provider.clone();
        provider.complete("s", "u").await.unwrap();
        assert_eq!(clone.call_count(), 1);
    }

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::Communication("refused".into()).is_transient());
        assert!(LlmError::Timeout.is_transient());
        assert!(LlmError::RateLimited.is_transient());
        assert!(LlmError::Decode("bad envelope".into()).is_transient());
        assert!(LlmError::Upstream { status: 502, body: String::new() }.is_transient());
        assert!(!LlmError::Upstream { status: 401, body: String::new() }.is_transient());
        assert!(!LlmError::InvalidResponse("no choices".into()).is_transient());
    }
}
