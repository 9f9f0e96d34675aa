//! テキスト生成のエラー型定義

use thiserror::Error;

/// テキスト生成コラボレーターのエラー型
#[derive(Error, Debug)]
pub enum LlmError {
    /// API呼び出しエラー
    #[error("API error: {0}")]
    ApiError(String),

    /// 無効なリクエスト
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 期待した形式ではないレスポンス
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// プロバイダー未対応
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// タイムアウト
    #[error("Request timeout after {0}s")]
    Timeout(u64),

    /// JSONパースエラー
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// テキスト生成の結果型
pub type LlmResult<T> = Result<T, LlmError>;
