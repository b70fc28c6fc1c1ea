use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded, retry after {0}s")]
    RateLimitExceeded(u64),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No API key found (set {0})")]
    MissingApiKey(String),
}

impl LLMError {
    /// Like `From<reqwest::Error>`, but keeps timeouts distinguishable
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LLMError::Timeout
        } else {
            LLMError::NetworkError(err)
        }
    }
}

/// A single prompt for a text-generation backend
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: 2048,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Prompt in, text out
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LLMError>;
}

/// Remove a surrounding markdown code fence, if there is one
pub fn strip_code_fences(response: &str) -> &str {
    let mut cleaned = response.trim();

    if cleaned.starts_with("```") {
        // Drop the opening ``` or ```lang line
        cleaned = match cleaned.find('\n') {
            Some(first_newline) => &cleaned[first_newline + 1..],
            None => cleaned.trim_start_matches('`'),
        };
        if let Some(last_backticks) = cleaned.rfind("```") {
            cleaned = &cleaned[..last_backticks];
        }
        cleaned = cleaned.trim();
    }

    cleaned
}

/// Reduce a model reply to a single command line
pub fn clean_command(response: &str) -> String {
    let mut cleaned = strip_code_fences(response);

    // Take only the first line (in case there's explanation after)
    if let Some(first_line) = cleaned.lines().next() {
        cleaned = first_line.trim();
    }

    // Inline `backticks` around the whole command
    if cleaned.len() >= 2 && cleaned.starts_with('`') && cleaned.ends_with('`') {
        cleaned = cleaned.trim_matches('`').trim();
    }

    cleaned.strip_prefix("$ ").unwrap_or(cleaned).to_string()
}
