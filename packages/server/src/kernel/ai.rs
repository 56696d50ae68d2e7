// CompletionProvider backed by the OpenAI chat-completions API
//
// Infrastructure only: the matching domain decides what to ask.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient};
use tracing::debug;

use super::CompletionProvider;
use crate::config::PipelineConfig;

#[derive(Clone)]
pub struct OpenAICompletionProvider {
    client: OpenAIClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAICompletionProvider {
    pub fn new(client: OpenAIClient, config: &PipelineConfig) -> Self {
        Self {
            client,
            model: config.openai_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_completion_tokens,
        }
    }

    /// Build from an optional key; without one every call fails with a
    /// configuration error instead of the process refusing to start.
    pub fn from_api_key(api_key: Option<&str>, config: &PipelineConfig) -> Self {
        Self::new(OpenAIClient::new(api_key.unwrap_or_default()), config)
    }

    fn request(&self, prompt: &str) -> ChatRequest {
        ChatRequest::new(&self.model)
            .message(Message::user(prompt))
            .temperature(self.temperature)
            .token_limit(self.max_tokens)
    }
}

#[async_trait]
impl CompletionProvider for OpenAICompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .chat_completion(self.request(prompt))
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        if let Some(usage) = &response.usage {
            debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion usage"
            );
        }

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_pipeline_settings() {
        let provider = OpenAICompletionProvider::from_api_key(Some("sk-test"), &PipelineConfig::default());
        let request = provider.request("pick one");

        assert_eq!(request.model, "gpt-4");
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
    }

    #[tokio::test]
    async fn test_missing_key_fails_per_call() {
        let provider = OpenAICompletionProvider::from_api_key(None, &PipelineConfig::default());
        let err = provider.complete("pick one").await.unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
