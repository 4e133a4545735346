use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::{config::GenerationParams, error::EnrichmentError, provider::Provider};

/// The text-generation collaborator: prompt in, free text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, EnrichmentError>;
}

/// Client for OpenAI-compatible `chat/completions` endpoints.
pub struct ChatCompletionsClient {
    provider: Provider,
    api_key: String,
    http: reqwest::Client,
}

impl ChatCompletionsClient {
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    fn request_body(&self, prompt: &str, params: &GenerationParams) -> serde_json::Value {
        let mut body = json!({
            "model": self.provider.config().model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt,
                },
            ],
            "temperature": params.temperature,
            "top_p": params.top_p,
        });
        if self.provider.supports_top_k() {
            body["top_k"] = json!(params.top_k);
        }
        body
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, EnrichmentError> {
        let config = self.provider.config();
        debug!(
            provider = self.provider.name(),
            prompt_chars = prompt.len(),
            "sending completion request"
        );

        let response = self
            .http
            .post(config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_body(prompt, params))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        // Extract content from response
        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| EnrichmentError::MalformedResponse {
                reason: format!("Invalid API response: {:?}", response),
            })?;

        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_k_only_sent_where_supported() {
        let params = GenerationParams::default();

        let grok = ChatCompletionsClient::new(Provider::Grok, "k").request_body("hi", &params);
        assert_eq!(grok["temperature"], json!(0.0));
        assert_eq!(grok["top_p"], json!(0.5));
        assert!(grok.get("top_k").is_none());
        assert_eq!(grok["messages"][0]["content"], json!("hi"));

        let gemini = ChatCompletionsClient::new(Provider::Gemini, "k").request_body("hi", &params);
        assert_eq!(gemini["top_k"], json!(1));
    }
}
