//! サマリー・信頼度・推奨事項の算出

use super::types::{DetectedAnomaly, DetectionMethod, DetectionSummary, Severity};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// 異常率がこの値（%）を超えるとノイズまたは設定ミスを疑う
pub const HIGH_RATE_PERCENT: f64 = 20.0;

/// 異常率がこの値（%）未満だと検知漏れを疑う
pub const LOW_RATE_PERCENT: f64 = 1.0;

/// 信頼度がこの値未満なら複数手法の併用を推奨
pub const LOW_CONFIDENCE: f64 = 0.7;

/// 異常率（%）。入力が空の場合は0。
pub fn anomaly_rate(anomaly_count: usize, total_points: usize) -> f64 {
    if total_points == 0 {
        return 0.0;
    }
    100.0 * anomaly_count as f64 / total_points as f64
}

/// 手法と異常率から信頼度を算出
pub fn confidence(method: DetectionMethod, rate: f64) -> f64 {
    let adjustment = if rate > HIGH_RATE_PERCENT {
        0.8
    } else if rate < LOW_RATE_PERCENT {
        0.9
    } else {
        1.0
    };
    (method.base_confidence() * adjustment).min(1.0)
}

/// サマリーを構築
pub fn build_summary(
    anomalies: &[DetectedAnomaly],
    total_points: usize,
    method: DetectionMethod,
) -> DetectionSummary {
    let rate = anomaly_rate(anomalies.len(), total_points);

    let mut severity_distribution = BTreeMap::new();
    for anomaly in anomalies {
        *severity_distribution
            .entry(anomaly.result.severity)
            .or_insert(0) += 1;
    }

    DetectionSummary {
        total_anomalies: anomalies.len(),
        anomaly_rate: rate,
        severity_distribution,
        method_used: method,
        confidence: confidence(method, rate),
    }
}

/// 推奨事項を生成
///
/// 異常なしの場合は正常メッセージのみ。それ以外は該当するルールをすべて適用する。
/// 直近判定は系列の時間範囲ではなく`now`基準。
pub fn recommendations(
    anomalies: &[DetectedAnomaly],
    summary: &DetectionSummary,
    now: DateTime<Utc>,
) -> Vec<String> {
    if anomalies.is_empty() {
        return vec![
            "No anomalies detected. The data appears to be within normal parameters.".to_string(),
        ];
    }

    let mut recommendations = Vec::new();

    if summary.anomaly_rate > HIGH_RATE_PERCENT {
        recommendations.push(
            "High anomaly rate detected. Review data quality or lower the sensitivity setting."
                .to_string(),
        );
    }

    let count = |severity: Severity| {
        summary
            .severity_distribution
            .get(&severity)
            .copied()
            .unwrap_or(0)
    };

    if count(Severity::Critical) > 0 {
        recommendations
            .push("Critical anomalies detected. Immediate investigation recommended.".to_string());
    }

    if count(Severity::High) > 3 {
        recommendations.push(
            "Multiple high-severity anomalies detected. Review the underlying processes."
                .to_string(),
        );
    }

    let recent_cutoff = now - Duration::days(7);
    let recent = anomalies
        .iter()
        .filter(|a| a.timestamp >= recent_cutoff)
        .count();
    if recent * 2 > anomalies.len() {
        recommendations.push(
            "Most anomalies occurred within the last 7 days. Monitor current conditions closely."
                .to_string(),
        );
    }

    if summary.confidence < LOW_CONFIDENCE {
        recommendations.push(
            "Detection confidence is low. Consider validating with multiple detection methods."
                .to_string(),
        );
    }

    recommendations
}
