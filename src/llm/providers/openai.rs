//! OpenAIプロバイダー実装

use crate::llm::{
    config::LlmConfig,
    error::{LlmError, LlmResult},
    providers::LlmProvider as LlmProviderTrait,
    types::{LlmRequest, LlmResponse, Message, Role},
};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

/// OpenAIプロバイダー
pub struct OpenAIProvider {
    client: Client<OpenAIConfig>,
    config: LlmConfig,
}

impl OpenAIProvider {
    /// 新しいOpenAIプロバイダーを作成
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        config.validate()?;

        let api_key = config
            .get_api_key()
            .ok_or_else(|| LlmError::ConfigError("API key is required".to_string()))?;

        let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));

        Ok(Self { client, config })
    }

    /// カスタムエンドポイント（Azure / ローカル）用のプロバイダーを作成
    pub fn with_endpoint(config: LlmConfig) -> LlmResult<Self> {
        config.validate()?;

        let endpoint = config
            .endpoint
            .as_ref()
            .ok_or_else(|| LlmError::ConfigError("Endpoint is required".to_string()))?;

        let mut openai_config = OpenAIConfig::new().with_api_base(endpoint);
        if let Some(api_key) = config.get_api_key() {
            openai_config = openai_config.with_api_key(api_key);
        }

        let client = Client::with_config(openai_config);

        Ok(Self { client, config })
    }

    /// メッセージを変換
    fn convert_messages(&self, messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .filter_map(|msg| match msg.role {
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(msg.content.clone())
                    .build()
                    .ok()
                    .map(Into::into),
            })
            .collect()
    }
}

#[async_trait]
impl LlmProviderTrait for OpenAIProvider {
    async fn complete(&self, request: &LlmRequest) -> LlmResult<LlmResponse> {
        let messages = self.convert_messages(&request.messages);

        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());

        let mut req_builder = CreateChatCompletionRequestArgs::default();
        req_builder
            .model(&model)
            .messages(messages)
            .temperature(request.temperature.unwrap_or(self.config.default_temperature))
            .max_tokens(request.max_tokens.unwrap_or(self.config.default_max_tokens) as u32);

        let chat_request = req_builder
            .build()
            .map_err(|e| LlmError::InvalidRequest(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| LlmError::ApiError(e.to_string()))?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        Ok(LlmResponse {
            content: choice.message.content.clone().unwrap_or_default(),
            model: response.model,
            finish_reason: choice.finish_reason.as_ref().map(|r| format!("{:?}", r)),
        })
    }

    fn name(&self) -> &str {
        match self.config.provider {
            crate::llm::config::LlmProvider::OpenAI => "OpenAI",
            crate::llm::config::LlmProvider::AzureOpenAI => "Azure OpenAI",
            crate::llm::config::LlmProvider::Local => "Local",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let config = LlmConfig::openai("test-key", "gpt-4o-mini");
        let provider = OpenAIProvider::new(config).unwrap();
        assert_eq!(provider.name(), "OpenAI");
    }

    #[test]
    fn test_local_provider_creation() {
        let config = LlmConfig::local("http://localhost:8080/v1", "llama-3");
        let provider = OpenAIProvider::with_endpoint(config).unwrap();
        assert_eq!(provider.name(), "Local");
    }

    #[test]
    fn test_message_conversion() {
        let config = LlmConfig::openai("test-key", "gpt-4o-mini");
        let provider = OpenAIProvider::new(config).unwrap();

        let messages = vec![Message::user("0: 1.0\n1: 2.0")];

        assert_eq!(provider.convert_messages(&messages).len(), 1);
    }
}
