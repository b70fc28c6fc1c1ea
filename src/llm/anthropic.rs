use crate::llm::client::{GenerationRequest, LLMError, TextGenerator};
use crate::llm::http::{build_client, endpoint, send_with_retry};
use crate::llm::rate_limit::RateLimiter;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

pub struct AnthropicClient {
    api_key: String,
    model: String,
    base_url: String,
    http_client: Client,
    limiter: RateLimiter,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, LLMError> {
        Ok(Self {
            api_key,
            model,
            base_url: ANTHROPIC_API_URL.to_string(),
            http_client: build_client(timeout)?,
            limiter: RateLimiter::new(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_body<'a>(&'a self, request: &'a GenerationRequest) -> AnthropicRequest<'a> {
        AnthropicRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: request.system.as_deref(),
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        }
    }

    fn extract_text(response: AnthropicResponse) -> Result<String, LLMError> {
        let text: String = response
            .content
            .into_iter()
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(LLMError::InvalidResponse("No content in response".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LLMError> {
        self.limiter.check()?;

        let url = endpoint(&self.base_url, "messages");
        let body = self.request_body(request);

        let response = send_with_retry(|| {
            self.http_client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&body)
        })
        .await?;

        let api_response: AnthropicResponse =
            response.json().await.map_err(LLMError::from_transport)?;
        Self::extract_text(api_response)
    }
}
