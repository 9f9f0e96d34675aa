//! 分析ユーティリティの統合テスト

use anomaly_rs::analytics::anomaly::{
    AnomalyDetectionService, DetectionOptions, Severity, TimeSeriesPoint,
};
use anomaly_rs::storage::InMemoryConfigRepository;
use anomaly_rs::{
    calculate_anomaly_trends, filter_anomalies, generate_alerts, AnomalyFilter, TrendDirection,
};
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

fn series(values: &[f64]) -> Vec<TimeSeriesPoint> {
    let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| TimeSeriesPoint::new(start + Duration::hours(i as i64), v))
        .collect()
}

fn values_with_spikes(spikes: &[(usize, f64)]) -> Vec<f64> {
    let mut values: Vec<f64> = (0..100).map(|i| 30.0 + (i % 5) as f64).collect();
    for &(index, value) in spikes {
        values[index] = value;
    }
    values
}

#[tokio::test]
async fn test_detection_to_alerts_and_filters() {
    let svc = AnomalyDetectionService::new(Arc::new(InMemoryConfigRepository::new()));
    let data = series(&values_with_spikes(&[(10, 90.0), (60, 140.0), (80, 45.0)]));
    let options = DetectionOptions::default().with_threshold(2.0);

    let result = svc.detect_anomalies(&data, &options).await.unwrap();
    assert!(!result.anomalies.is_empty());

    let alerts = generate_alerts(&result.anomalies);
    assert!(alerts.iter().all(|a| a.severity >= Severity::High));
    assert_eq!(
        alerts.len(),
        result
            .anomalies
            .iter()
            .filter(|a| a.result.severity >= Severity::High)
            .count()
    );
    for alert in &alerts {
        assert!(alert.id.starts_with("anomaly-"));
    }

    let window = AnomalyFilter::new().with_time_range(data[50].timestamp, data[99].timestamp);
    let late = filter_anomalies(&result.anomalies, &window);
    assert!(late.iter().all(|a| a.index >= 50));
    assert!(late.iter().any(|a| a.index == 60));

    let critical = AnomalyFilter::new().with_severities([Severity::Critical]);
    assert!(filter_anomalies(&result.anomalies, &critical)
        .iter()
        .all(|a| a.result.severity == Severity::Critical));
}

#[tokio::test]
async fn test_trend_between_runs() {
    let svc = AnomalyDetectionService::new(Arc::new(InMemoryConfigRepository::new()));
    let options = DetectionOptions::default().with_threshold(2.0);

    let quiet = svc
        .detect_anomalies(&series(&values_with_spikes(&[(40, 90.0)])), &options)
        .await
        .unwrap();
    let noisy = svc
        .detect_anomalies(
            &series(&values_with_spikes(&[(10, 90.0), (40, 95.0), (70, 88.0)])),
            &options,
        )
        .await
        .unwrap();

    let trend = calculate_anomaly_trends(&[quiet.summary.clone(), noisy.summary.clone()]);
    assert_eq!(
        trend.rate_change,
        noisy.summary.anomaly_rate - quiet.summary.anomaly_rate
    );
    assert!(trend.is_increasing);
    assert_eq!(trend.direction, TrendDirection::Increasing);

    let reversed = calculate_anomaly_trends(&[noisy.summary, quiet.summary.clone()]);
    assert_eq!(reversed.direction, TrendDirection::Decreasing);

    let single = calculate_anomaly_trends(&[quiet.summary]);
    assert_eq!(single.direction, TrendDirection::Stable);
    assert_eq!(single.rate_change, 0.0);
}
