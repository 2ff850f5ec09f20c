//! Mock backend for testing
//!
//! Returns canned completions without any network traffic. Failure modes can
//! be injected to exercise the gateway error paths.

use async_trait::async_trait;

use super::{Completion, GatewayError, GatewayResult, InsightBackend};

/// Failure to inject instead of a completion
#[derive(Debug, Clone, Copy)]
pub enum MockFailure {
    Network,
    Auth,
    RateLimited,
    MalformedResponse,
}

/// Canned-response backend
#[derive(Clone)]
pub struct MockBackend {
    response: String,
    citations: Vec<String>,
    failure: Option<MockFailure>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            response: "Mock insight: track your recurring costs.".to_string(),
            citations: Vec::new(),
            failure: None,
        }
    }

    /// Return a specific completion text
    pub fn with_response(response: &str) -> Self {
        Self {
            response: response.to_string(),
            ..Self::new()
        }
    }

    /// Fail every call with the given error kind
    pub fn with_failure(failure: MockFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::new()
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InsightBackend for MockBackend {
    async fn complete(&self, _prompt: &str) -> GatewayResult<Completion> {
        match self.failure {
            Some(MockFailure::Network) => Err(GatewayError::Network("mock network failure".into())),
            Some(MockFailure::Auth) => Err(GatewayError::Auth),
            Some(MockFailure::RateLimited) => Err(GatewayError::RateLimited),
            Some(MockFailure::MalformedResponse) => {
                Err(GatewayError::MalformedResponse("mock malformed body".into()))
            }
            None => Ok(Completion {
                text: self.response.clone(),
                citations: self.citations.clone(),
            }),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_response() {
        let backend = MockBackend::with_response("hello");
        let completion = backend.complete("ignored").await.unwrap();
        assert_eq!(completion.text, "hello");
        assert!(completion.citations.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let backend = MockBackend::with_failure(MockFailure::RateLimited);
        assert!(matches!(
            backend.complete("x").await.unwrap_err(),
            GatewayError::RateLimited
        ));

        let backend = MockBackend::with_failure(MockFailure::Auth);
        assert!(matches!(
            backend.complete("x").await.unwrap_err(),
            GatewayError::Auth
        ));
    }
}
