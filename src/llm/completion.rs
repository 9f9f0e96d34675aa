//! テキスト生成コラボレーターのインターフェース

use crate::llm::error::LlmResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 生成パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// 最大トークン数
    pub max_tokens: usize,
    /// 温度
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.1,
        }
    }
}

/// テキスト生成サービス
///
/// 異常検知側からはブラックボックスとして扱う。
/// 実装は通信エラーを`LlmError`として返すこと。呼び出しの制限時間は
/// AI検知戦略が`ai.timeout_secs`で一括して適用する。
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// プロンプトに対するテキストを生成
    async fn generate_text(
        &self,
        model_id: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> LlmResult<String>;
}
