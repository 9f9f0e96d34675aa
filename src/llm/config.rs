//! テキスト生成プロバイダーの設定

use crate::llm::error::{LlmError, LlmResult};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// LLMプロバイダー
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI
    OpenAI,
    /// Azure OpenAI
    AzureOpenAI,
    /// ローカルLLM（OpenAI互換エンドポイント）
    Local,
}

/// LLM設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// プロバイダー
    pub provider: LlmProvider,
    /// APIキー（セキュア）
    #[serde(skip_serializing)]
    pub api_key: Option<SecretString>,
    /// APIエンドポイント
    pub endpoint: Option<String>,
    /// デフォルトモデル
    pub default_model: String,
    /// デフォルト温度
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,
    /// デフォルト最大トークン数
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: usize,
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> usize {
    1000
}

impl LlmConfig {
    /// OpenAI設定を作成
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            api_key: Some(SecretString::new(api_key.into().into_boxed_str())),
            endpoint: None,
            default_model: model.into(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
        }
    }

    /// 環境変数からOpenAI設定を読み込み
    pub fn openai_from_env() -> LlmResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::ConfigError("OPENAI_API_KEY not set".to_string()))?;

        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        Ok(Self::openai(api_key, model))
    }

    /// Azure OpenAI設定を作成
    pub fn azure_openai(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider: LlmProvider::AzureOpenAI,
            endpoint: Some(endpoint.into()),
            ..Self::openai(api_key, model)
        }
    }

    /// ローカルLLM設定を作成
    pub fn local(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Local,
            api_key: None,
            endpoint: Some(endpoint.into()),
            default_model: model.into(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
        }
    }

    /// APIキーを取得（露出）
    pub fn get_api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret())
    }

    /// 設定を検証
    pub fn validate(&self) -> LlmResult<()> {
        match self.provider {
            LlmProvider::OpenAI | LlmProvider::AzureOpenAI => {
                if self.api_key.is_none() {
                    return Err(LlmError::ConfigError(
                        "API key is required for OpenAI providers".to_string(),
                    ));
                }
            }
            LlmProvider::Local => {
                if self.endpoint.is_none() {
                    return Err(LlmError::ConfigError(
                        "Endpoint is required for local providers".to_string(),
                    ));
                }
            }
        }

        if self.provider == LlmProvider::AzureOpenAI && self.endpoint.is_none() {
            return Err(LlmError::ConfigError(
                "Endpoint is required for Azure OpenAI".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(LlmError::ConfigError(
                "Temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if self.default_max_tokens == 0 || self.default_max_tokens > 100_000 {
            return Err(LlmError::ConfigError(
                "max_tokens must be between 1 and 100000".to_string(),
            ));
        }

        Ok(())
    }
}
