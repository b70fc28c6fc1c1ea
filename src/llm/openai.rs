use crate::llm::client::{GenerationRequest, LLMError, TextGenerator};
use crate::llm::http::{build_client, endpoint, send_with_retry};
use crate::llm::rate_limit::RateLimiter;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat-completions client; works with any OpenAI-compatible server
pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    http_client: Client,
    limiter: RateLimiter,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, LLMError> {
        Ok(Self {
            api_key,
            model,
            base_url: OPENAI_API_URL.to_string(),
            http_client: build_client(timeout)?,
            limiter: RateLimiter::new(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request_body<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            messages,
        }
    }

    fn extract_text(response: ChatResponse) -> Result<String, LLMError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LLMError::InvalidResponse("No content in response".to_string()))
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LLMError> {
        self.limiter.check()?;

        let url = endpoint(&self.base_url, "chat/completions");
        let body = self.request_body(request);

        let response = send_with_retry(|| {
            self.http_client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;

        let api_response: ChatResponse = response.json().await.map_err(LLMError::from_transport)?;
        Self::extract_text(api_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient::new(
            "test-key".to_string(),
            "gpt-3.5-turbo".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_request_body_system_first() {
        let client = client();
        let request = GenerationRequest::new("list files").with_system("shell only");
        let json = serde_json::to_value(client.request_body(&request)).unwrap();

        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "list files");
    }

    #[test]
    fn test_extract_text() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"ls -la"}}]}"#,
        )
        .unwrap();
        assert_eq!(OpenAiClient::extract_text(response).unwrap(), "ls -la");
    }

    #[test]
    fn test_extract_text_null_content() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(OpenAiClient::extract_text(response).is_err());
    }

    #[test]
    fn test_custom_base_url() {
        let client = client().with_base_url("http://localhost:11434/v1");
        assert_eq!(client.base_url, "http://localhost:11434/v1");
    }
}
