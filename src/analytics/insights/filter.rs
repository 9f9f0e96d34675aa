//! 条件による異常の絞り込み

use crate::analytics::anomaly::{DetectedAnomaly, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 絞り込み条件
///
/// 指定された条件はすべてAND結合される。時刻範囲は両端を含む。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFilter {
    /// 許可する重大度
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severities: Option<BTreeSet<Severity>>,
    /// 開始時刻（含む）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    /// 終了時刻（含む）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// 最小スコア
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
}

impl AnomalyFilter {
    /// 条件なしのフィルタを作成
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_severities(mut self, severities: impl IntoIterator<Item = Severity>) -> Self {
        self.severities = Some(severities.into_iter().collect());
        self
    }

    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_time_range(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.with_start(start).with_end(end)
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// 異常が全条件を満たすか
    pub fn matches(&self, anomaly: &DetectedAnomaly) -> bool {
        if let Some(severities) = &self.severities {
            if !severities.contains(&anomaly.result.severity) {
                return false;
            }
        }
        if self.start.is_some_and(|start| anomaly.timestamp < start) {
            return false;
        }
        if self.end.is_some_and(|end| anomaly.timestamp > end) {
            return false;
        }
        if self.min_score.is_some_and(|min| anomaly.result.score < min) {
            return false;
        }
        true
    }
}

/// 条件を満たす異常のみを返す（入力順を保持）
pub fn filter_anomalies(anomalies: &[DetectedAnomaly], filter: &AnomalyFilter) -> Vec<DetectedAnomaly> {
    anomalies
        .iter()
        .filter(|a| filter.matches(a))
        .cloned()
        .collect()
}
