//! アラート生成

use crate::analytics::anomaly::{DetectedAnomaly, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 高・致命的な異常から生成されるアラート
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAlert {
    /// `anomaly-{タイムスタンプ(ミリ秒)}-{インデックス}`
    pub id: String,
    /// 異常が発生した時刻
    pub timestamp: DateTime<Utc>,
    /// 重大度（high / critical）
    pub severity: Severity,
    /// 重大度・位置・説明を含む表示用メッセージ
    pub message: String,
    /// 観測値
    pub value: f64,
    /// 異常スコア
    pub score: f64,
}

impl AnomalyAlert {
    fn from_anomaly(anomaly: &DetectedAnomaly) -> Self {
        let severity = anomaly.result.severity;
        Self {
            id: format!(
                "anomaly-{}-{}",
                anomaly.timestamp.timestamp_millis(),
                anomaly.index
            ),
            timestamp: anomaly.timestamp,
            severity,
            message: format!(
                "{} severity anomaly at index {}: {}",
                severity, anomaly.index, anomaly.result.explanation
            ),
            value: anomaly.value,
            score: anomaly.result.score,
        }
    }
}

/// 重大度がhigh以上の異常のみをアラートに変換（入力順を保持）
pub fn generate_alerts(anomalies: &[DetectedAnomaly]) -> Vec<AnomalyAlert> {
    anomalies
        .iter()
        .filter(|a| a.result.severity >= Severity::High)
        .map(AnomalyAlert::from_anomaly)
        .collect()
}
