//! 永続化される検知設定の型

use crate::analytics::anomaly::DetectionOptions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDetectionConfig {
    /// 所有ユーザー
    #[validate(length(min = 1, max = 255))]
    pub user_id: String,
    /// 設定名
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// データソース識別子
    #[validate(length(min = 1, max = 1024))]
    pub data_source: String,
    /// 閾値設定
    pub threshold_config: DetectionOptions,
}

/// 保存済みの検知設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfigRecord {
    /// レコードID
    pub id: Uuid,
    /// 所有ユーザー
    pub user_id: String,
    /// 設定名
    pub name: String,
    /// データソース識別子
    pub data_source: String,
    /// 閾値設定
    pub threshold_config: DetectionOptions,
    /// 作成日時
    pub created_at: DateTime<Utc>,
}

impl DetectionConfigRecord {
    /// 作成リクエストから新しいレコードを生成
    pub fn from_new(config: NewDetectionConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: config.user_id,
            name: config.name,
            data_source: config.data_source,
            threshold_config: config.threshold_config,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> NewDetectionConfig {
        NewDetectionConfig {
            user_id: "user-1".to_string(),
            name: name.to_string(),
            data_source: "metrics.cpu".to_string(),
            threshold_config: DetectionOptions::default(),
        }
    }

    #[test]
    fn test_validation() {
        assert!(request("cpu spikes").validate().is_ok());
        assert!(request("").validate().is_err());
        assert!(request(&"x".repeat(256)).validate().is_err());
    }

    #[test]
    fn test_record_from_new() {
        let record = DetectionConfigRecord::from_new(request("cpu spikes"));
        assert_eq!(record.name, "cpu spikes");
        assert_eq!(record.threshold_config, DetectionOptions::default());
    }
}
