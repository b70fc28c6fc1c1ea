pub mod anthropic;
pub mod client;
pub mod gemini;
pub mod http;
pub mod openai;
pub mod prompts;
pub mod rate_limit;

pub use anthropic::AnthropicClient;
pub use client::{GenerationRequest, LLMError, TextGenerator, clean_command, strip_code_fences};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use rate_limit::RateLimiter;

use crate::config::{Config, Provider};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Build the configured backend once at startup
pub fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, LLMError> {
    let api_key = config
        .get_api_key()
        .ok_or_else(|| LLMError::MissingApiKey(config.llm.key_env().to_string()))?;
    let model = config.llm.model().to_string();
    let timeout = Duration::from_secs(config.llm.timeout_seconds);
    let base_url = config.llm.base_url.clone();

    debug!(provider = ?config.llm.provider, %model, "building text generator");

    let generator: Arc<dyn TextGenerator> = match config.llm.provider {
        Provider::OpenAi => {
            let client = OpenAiClient::new(api_key, model, timeout)?;
            Arc::new(match base_url {
                Some(url) => client.with_base_url(url),
                None => client,
            })
        }
        Provider::Anthropic => {
            let client = AnthropicClient::new(api_key, model, timeout)?;
            Arc::new(match base_url {
                Some(url) => client.with_base_url(url),
                None => client,
            })
        }
        Provider::Gemini => {
            let client = GeminiClient::new(api_key, model, timeout)?;
            Arc::new(match base_url {
                Some(url) => client.with_base_url(url),
                None => client,
            })
        }
    };

    Ok(generator)
}
