//! LLMプロバイダー実装

#[cfg(feature = "llm-integration")]
pub mod openai;

use crate::llm::{
    config::LlmConfig,
    error::LlmResult,
    types::{LlmRequest, LlmResponse},
};
use async_trait::async_trait;

/// LLMプロバイダートレイト
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// 完了リクエスト
    async fn complete(&self, request: &LlmRequest) -> LlmResult<LlmResponse>;

    /// プロバイダー名を取得
    fn name(&self) -> &str;
}

/// プロバイダーファクトリー
#[cfg(feature = "llm-integration")]
pub fn create_provider(config: &LlmConfig) -> LlmResult<Box<dyn LlmProvider>> {
    use crate::llm::config::LlmProvider as ProviderType;

    match config.provider {
        ProviderType::OpenAI => Ok(Box::new(openai::OpenAIProvider::new(config.clone())?)),
        ProviderType::AzureOpenAI | ProviderType::Local => Ok(Box::new(
            openai::OpenAIProvider::with_endpoint(config.clone())?,
        )),
    }
}

/// プロバイダーファクトリー（`llm-integration`無効時）
#[cfg(not(feature = "llm-integration"))]
pub fn create_provider(config: &LlmConfig) -> LlmResult<Box<dyn LlmProvider>> {
    Err(crate::llm::error::LlmError::UnsupportedProvider(format!(
        "{:?} provider requires the llm-integration feature",
        config.provider
    )))
}
