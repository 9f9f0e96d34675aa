//! テキスト生成コラボレーター
//!
//! AI検知戦略が利用する外部テキスト生成サービスとの統合。
//! 検知側は`TextCompletion`トレイトのみに依存し、プロバイダーは差し替え可能。

pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use client::LlmClient;
pub use completion::{GenerationOptions, TextCompletion};
pub use self::config::{LlmConfig, LlmProvider};
pub use error::{LlmError, LlmResult};
pub use types::{LlmRequest, LlmResponse, Message, Role};
