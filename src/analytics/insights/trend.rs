//! 検知実行間のトレンド比較

use crate::analytics::anomaly::{DetectionSummary, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// トレンドの方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// 異常率が上昇
    Increasing,
    /// 異常率が低下
    Decreasing,
    /// 異常率が変化なし
    Stable,
}

/// 直近2回の検知実行の比較結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyTrend {
    /// 異常率の変化（パーセントポイント）
    pub rate_change: f64,
    /// 異常率が増加したか
    pub is_increasing: bool,
    /// 変化の方向
    pub direction: TrendDirection,
    /// 重大度ごとの件数の変化
    pub severity_changes: BTreeMap<Severity, i64>,
}

impl Default for AnomalyTrend {
    fn default() -> Self {
        Self {
            rate_change: 0.0,
            is_increasing: false,
            direction: TrendDirection::Stable,
            severity_changes: BTreeMap::new(),
        }
    }
}

const SEVERITIES: [Severity; 4] = [
    Severity::Low,
    Severity::Medium,
    Severity::High,
    Severity::Critical,
];

/// 時系列順のサマリー列から最後の2件を比較
///
/// 2件未満の場合は変化なしのトレンドを返す。
pub fn calculate_anomaly_trends(history: &[DetectionSummary]) -> AnomalyTrend {
    let [.., previous, latest] = history else {
        return AnomalyTrend::default();
    };

    let rate_change = latest.anomaly_rate - previous.anomaly_rate;
    let direction = if rate_change > 0.0 {
        TrendDirection::Increasing
    } else if rate_change < 0.0 {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    let count = |summary: &DetectionSummary, severity: Severity| {
        summary
            .severity_distribution
            .get(&severity)
            .copied()
            .unwrap_or(0) as i64
    };

    let severity_changes = SEVERITIES
        .iter()
        .map(|&s| (s, count(latest, s) - count(previous, s)))
        .collect();

    AnomalyTrend {
        rate_change,
        is_increasing: rate_change > 0.0,
        direction,
        severity_changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::anomaly::DetectionMethod;

    fn summary(rate: f64, counts: &[(Severity, usize)]) -> DetectionSummary {
        DetectionSummary {
            total_anomalies: counts.iter().map(|(_, c)| c).sum(),
            anomaly_rate: rate,
            severity_distribution: counts.iter().copied().collect(),
            method_used: DetectionMethod::ZScore,
            confidence: 0.8,
        }
    }

    #[test]
    fn test_fewer_than_two_runs_is_neutral() {
        assert_eq!(calculate_anomaly_trends(&[]), AnomalyTrend::default());
        let single = [summary(12.0, &[(Severity::High, 2)])];
        let trend = calculate_anomaly_trends(&single);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert!(!trend.is_increasing);
        assert!(trend.severity_changes.is_empty());
    }

    #[test]
    fn test_compares_last_two_runs() {
        let history = [
            summary(50.0, &[(Severity::Critical, 9)]),
            summary(2.0, &[(Severity::High, 1), (Severity::Low, 3)]),
            summary(5.0, &[(Severity::High, 4), (Severity::Critical, 1)]),
        ];
        let trend = calculate_anomaly_trends(&history);

        assert_eq!(trend.rate_change, 3.0);
        assert!(trend.is_increasing);
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert_eq!(trend.severity_changes[&Severity::High], 3);
        assert_eq!(trend.severity_changes[&Severity::Low], -3);
        assert_eq!(trend.severity_changes[&Severity::Critical], 1);
        assert_eq!(trend.severity_changes[&Severity::Medium], 0);
    }

    #[test]
    fn test_decreasing_and_stable() {
        let down = [summary(8.0, &[]), summary(4.0, &[])];
        assert_eq!(
            calculate_anomaly_trends(&down).direction,
            TrendDirection::Decreasing
        );

        let flat = [summary(4.0, &[]), summary(4.0, &[])];
        let trend = calculate_anomaly_trends(&flat);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert!(!trend.is_increasing);
    }
}
