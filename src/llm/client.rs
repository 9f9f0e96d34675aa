//! LLMクライアント

use crate::llm::{
    completion::{GenerationOptions, TextCompletion},
    config::LlmConfig,
    error::LlmResult,
    providers::{create_provider, LlmProvider},
    types::{LlmRequest, LlmResponse, Message},
};
use async_trait::async_trait;

/// LLMクライアント
///
/// プロバイダーを1つ保持し、`TextCompletion`として検知サービスに注入される。
/// タイムアウトは呼び出し側（AI検知の`ai.timeout_secs`）が管理する。
pub struct LlmClient {
    provider: Box<dyn LlmProvider>,
    config: LlmConfig,
}

impl LlmClient {
    /// 新しいクライアントを作成
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        config.validate()?;
        let provider = create_provider(&config)?;

        Ok(Self { provider, config })
    }

    /// 任意のプロバイダーでクライアントを作成
    pub fn with_provider(config: LlmConfig, provider: Box<dyn LlmProvider>) -> LlmResult<Self> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    /// 設定を取得
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// 完了リクエストを送信
    pub async fn complete(&self, request: LlmRequest) -> LlmResult<LlmResponse> {
        self.provider.complete(&request).await
    }

    /// プロバイダー名を取得
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

#[async_trait]
impl TextCompletion for LlmClient {
    async fn generate_text(
        &self,
        model_id: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> LlmResult<String> {
        let request = LlmRequest::new(vec![Message::user(prompt)])
            .with_model(model_id)
            .with_max_tokens(options.max_tokens)
            .with_temperature(options.temperature);

        let response = self.complete(request).await?;
        Ok(response.content)
    }
}
