use super::{AnomalyConfigRepository, DetectionConfigRecord, NewDetectionConfig};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

/// In-memory検知設定リポジトリ
///
/// 開発・テスト用途。プロセス終了時にデータは失われます。
#[derive(Clone, Default)]
pub struct InMemoryConfigRepository {
    records: Arc<RwLock<HashMap<Uuid, DetectionConfigRecord>>>,
}

impl InMemoryConfigRepository {
    /// 新しいIn-memoryリポジトリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済みの件数
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// 保存済みレコードが無いか
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AnomalyConfigRepository for InMemoryConfigRepository {
    async fn create_anomaly_detection(
        &self,
        config: NewDetectionConfig,
    ) -> Result<DetectionConfigRecord> {
        config.validate()?;
        config.threshold_config.validate()?;

        let record = DetectionConfigRecord::from_new(config);
        self.records.write().await.insert(record.id, record.clone());
        Ok(record)
    }
}
