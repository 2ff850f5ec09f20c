//! Perplexity backend implementation
//!
//! Speaks the Perplexity `/chat/completions` API with the exact request
//! shape the vendor documents for the `sonar` models. The field set is part
//! of the wire contract and tested below.
//!
//! # Configuration
//!
//! Environment variables:
//! - `PERPLEXITY_API_KEY`: API key (required)
//! - `PERPLEXITY_BASE_URL`: Base URL (default: https://api.perplexity.ai)
//! - `PERPLEXITY_MODEL`: Model name (default: sonar)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Completion, GatewayError, GatewayResult, InsightBackend};

const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
const DEFAULT_MODEL: &str = "sonar";
const SYSTEM_PROMPT: &str = "Be precise and concise.";

/// Perplexity chat-completions backend
#[derive(Clone)]
pub struct PerplexityBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl PerplexityBackend {
    /// Create a new Perplexity backend
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Create from environment variables
    ///
    /// Required: `PERPLEXITY_API_KEY`
    /// Optional: `PERPLEXITY_BASE_URL`, `PERPLEXITY_MODEL`
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("PERPLEXITY_API_KEY").ok()?;
        let base_url =
            std::env::var("PERPLEXITY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("PERPLEXITY_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Some(Self::new(&base_url, &model, &api_key))
    }
}

#[async_trait]
impl InsightBackend for PerplexityBackend {
    async fn complete(&self, prompt: &str) -> GatewayResult<Completion> {
        let request = ChatCompletionRequest::new(&self.model, prompt);

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::Auth);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GatewayError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Network(format!(
                "completion API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        debug!(model = %self.model, "Completion received");

        let text = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GatewayError::MalformedResponse("no choices in response".into()))?;

        Ok(Completion {
            text,
            citations: chat_response.citations,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

/// Perplexity chat completion request
///
/// Field set and values match the vendor's documented contract for sonar.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    stream: bool,
    return_images: bool,
    return_related_questions: bool,
    presence_penalty: f32,
    frequency_penalty: f32,
    web_search_options: WebSearchOptions,
}

impl ChatCompletionRequest {
    fn new(model: &str, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: 2048,
            temperature: 0.2,
            top_p: 0.9,
            top_k: 0,
            stream: false,
            return_images: false,
            return_related_questions: false,
            presence_penalty: 0.0,
            frequency_penalty: 1.0,
            web_search_options: WebSearchOptions {
                search_context_size: "high".to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct WebSearchOptions {
    search_context_size: String,
}

/// Perplexity chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = PerplexityBackend::new("https://api.perplexity.ai/", "sonar", "pplx-test");
        assert_eq!(backend.host(), "https://api.perplexity.ai");
        assert_eq!(backend.model(), "sonar");
    }

    #[test]
    fn test_request_wire_contract() {
        let request = ChatCompletionRequest::new("sonar", "How is my spending?");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "sonar");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "Be precise and concise.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "How is my spending?");
        assert_eq!(json["max_tokens"], 2048);
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 0.001);
        let top_p = json["top_p"].as_f64().unwrap();
        assert!((top_p - 0.9).abs() < 0.001);
        assert_eq!(json["top_k"], 0);
        assert_eq!(json["stream"], false);
        assert_eq!(json["return_images"], false);
        assert_eq!(json["return_related_questions"], false);
        assert_eq!(json["presence_penalty"].as_f64().unwrap(), 0.0);
        assert_eq!(json["frequency_penalty"].as_f64().unwrap(), 1.0);
        assert_eq!(json["web_search_options"]["search_context_size"], "high");
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "id": "cmpl-abc",
            "model": "sonar",
            "choices": [{
                "index": 0,
                "finish_reason": "stop",
                "message": {
                    "role": "assistant",
                    "content": "Spend less on takeout."
                }
            }],
            "citations": ["https://example.com/budgeting"]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "Spend less on takeout.");
        assert_eq!(response.citations, vec!["https://example.com/budgeting"]);
    }

    #[test]
    fn test_response_citations_default_empty() {
        let json = r#"{"choices": [{"message": {"content": "ok"}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert!(response.citations.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let backend = PerplexityBackend::new("http://127.0.0.1:1", "sonar", "pplx-test");
        let err = backend.complete("hello").await.unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }
}
