//! 検知設定の永続化
//!
//! 名前付きの検知設定を外部ストアに保存する。読み出し・一覧・更新・削除は扱わない。

mod memory;
mod postgres;
mod types;

pub use memory::InMemoryConfigRepository;
pub use postgres::PostgresConfigRepository;
pub use types::{DetectionConfigRecord, NewDetectionConfig};

use crate::error::Result;
use async_trait::async_trait;

/// 検知設定リポジトリのトレイト
///
/// 様々なストレージバックエンド(PostgreSQL, In-memory)に対応できるよう、
/// 抽象化されたインターフェースを提供します。
#[async_trait]
pub trait AnomalyConfigRepository: Send + Sync {
    /// 検知設定を作成
    async fn create_anomaly_detection(
        &self,
        config: NewDetectionConfig,
    ) -> Result<DetectionConfigRecord>;
}
