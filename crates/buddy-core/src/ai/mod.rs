//! Completion gateway abstraction
//!
//! One seam between the budgeting logic and the hosted LLM vendor:
//!
//! - `InsightBackend` trait: the single-turn completion interface
//! - `InsightClient` enum: concrete wrapper providing Clone + compile-time
//!   dispatch
//! - Backend implementations: `PerplexityBackend`, `MockBackend`
//!
//! Each invocation makes exactly one outbound call. Failures surface as
//! `GatewayError`; there is no retry layer, the caller decides what a failed
//! insight is worth.
//!
//! # Configuration
//!
//! Environment variables:
//! - `PERPLEXITY_API_KEY`: API key (required for the Perplexity backend)
//! - `PERPLEXITY_BASE_URL`: API base URL (default: https://api.perplexity.ai)
//! - `PERPLEXITY_MODEL`: Model name (default: sonar)
//! - `INSIGHT_BACKEND`: `perplexity` (default) or `mock`

mod mock;
mod perplexity;
pub mod sanitize;

pub use mock::{MockBackend, MockFailure};
pub use perplexity::PerplexityBackend;

use async_trait::async_trait;

/// Errors crossing the vendor boundary
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Transport failure or an unexpected HTTP status
    #[error("completion service unreachable: {0}")]
    Network(String),

    /// The vendor rejected our credentials (401/403)
    #[error("completion service rejected the API key")]
    Auth,

    /// The vendor throttled us (429)
    #[error("completion service rate limit exceeded")]
    RateLimited,

    /// The response body didn't match the wire contract
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// One model answer plus the sources it cited
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub text: String,
    pub citations: Vec<String>,
}

/// Single-turn completion interface all backends implement
#[async_trait]
pub trait InsightBackend: Send + Sync {
    /// Run one prompt through the model
    async fn complete(&self, prompt: &str) -> GatewayResult<Completion>;

    /// Model name (for logging)
    fn model(&self) -> &str;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete gateway client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum InsightClient {
    Perplexity(PerplexityBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl InsightClient {
    /// Create a gateway client from environment variables
    ///
    /// Returns None when the selected backend is not configured; the server
    /// runs without insights in that case.
    pub fn from_env() -> Option<Self> {
        let backend =
            std::env::var("INSIGHT_BACKEND").unwrap_or_else(|_| "perplexity".to_string());

        match backend.to_lowercase().as_str() {
            "perplexity" => PerplexityBackend::from_env().map(InsightClient::Perplexity),
            "mock" => Some(InsightClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown INSIGHT_BACKEND, falling back to perplexity");
                PerplexityBackend::from_env().map(InsightClient::Perplexity)
            }
        }
    }

    /// Create a mock client for testing
    pub fn mock() -> Self {
        InsightClient::Mock(MockBackend::new())
    }

    /// Run a prompt and render the answer as sanitized HTML
    ///
    /// Citation markers and markdown emphasis are stripped before the
    /// paragraph conversion.
    pub async fn generate_html(&self, prompt: &str) -> GatewayResult<String> {
        let completion = self.complete(prompt).await?;
        Ok(sanitize::render_html(&completion.text))
    }
}

#[async_trait]
impl InsightBackend for InsightClient {
    async fn complete(&self, prompt: &str) -> GatewayResult<Completion> {
        match self {
            InsightClient::Perplexity(b) => b.complete(prompt).await,
            InsightClient::Mock(b) => b.complete(prompt).await,
        }
    }

    fn model(&self) -> &str {
        match self {
            InsightClient::Perplexity(b) => b.model(),
            InsightClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            InsightClient::Perplexity(b) => b.host(),
            InsightClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_client_mock() {
        let client = InsightClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_complete() {
        let client = InsightClient::mock();
        let completion = client.complete("any prompt").await.unwrap();
        assert!(!completion.text.is_empty());
    }

    #[tokio::test]
    async fn test_generate_html_strips_markers() {
        let client = InsightClient::Mock(MockBackend::with_response(
            "Cut **coffee** runs[1]. Brew at home[2].",
        ));
        let html = client.generate_html("tips please").await.unwrap();
        assert_eq!(html, "<p>Cut coffee runs. Brew at home.</p>");
    }
}
