//! Batch Anomaly Detection
//!
//! 複数データセットを並行に処理する。1つのデータセットの失敗（エラー・パニック）は
//! 縮退結果として記録し、他のデータセットには影響させない。

use super::detector::AnomalyDetectionService;
use super::types::{AnomalyDetectionResult, DetectionOptions, TimeSeriesPoint};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error};

/// バッチ入力の1データセット
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDataset {
    /// データセットID
    pub id: String,
    /// 時系列
    pub data: Vec<TimeSeriesPoint>,
    /// 検知オプション（省略時はデフォルト）
    #[serde(default)]
    pub options: DetectionOptions,
}

impl BatchDataset {
    /// 新しいデータセットを作成
    pub fn new(id: impl Into<String>, data: Vec<TimeSeriesPoint>, options: DetectionOptions) -> Self {
        Self {
            id: id.into(),
            data,
            options,
        }
    }
}

/// データセットごとの結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// データセットID
    pub id: String,
    /// 検知結果（失敗時は縮退結果）
    pub result: AnomalyDetectionResult,
    /// 失敗理由
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResult {
    /// 縮退結果かどうか
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

impl AnomalyDetectionService {
    /// 複数データセットを一括検知
    ///
    /// 結果は入力と同じ順序で、入力と同じ件数を返す。
    pub async fn batch_detect_anomalies(&self, datasets: Vec<BatchDataset>) -> Vec<BatchResult> {
        let concurrency = self.config().batch.concurrency.max(1);
        let total = datasets.len();

        let results: Vec<BatchResult> = stream::iter(datasets)
            .map(|dataset| self.process_dataset(dataset))
            .buffered(concurrency)
            .collect()
            .await;

        debug!(
            datasets = total,
            degraded = results.iter().filter(|r| r.is_degraded()).count(),
            "Batch detection completed"
        );
        results
    }

    async fn process_dataset(&self, dataset: BatchDataset) -> BatchResult {
        let BatchDataset { id, data, options } = dataset;

        let outcome = AssertUnwindSafe(self.detect_anomalies(&data, &options))
            .catch_unwind()
            .await;

        let failure = match outcome {
            Ok(Ok(result)) => {
                return BatchResult {
                    id,
                    result,
                    error: None,
                }
            }
            Ok(Err(e)) => {
                error!("Error processing dataset {}: {}", id, e);
                e.to_string()
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!("Panic while processing dataset {}: {}", id, reason);
                reason
            }
        };

        BatchResult {
            id,
            result: AnomalyDetectionResult::degraded(options.method, &failure),
            error: Some(failure),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::anomaly::DetectionMethod;
    use crate::storage::InMemoryConfigRepository;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn service() -> AnomalyDetectionService {
        AnomalyDetectionService::new(Arc::new(InMemoryConfigRepository::new()))
    }

    fn points(values: &[f64]) -> Vec<TimeSeriesPoint> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| TimeSeriesPoint::new(start + Duration::days(i as i64), v))
            .collect()
    }

    #[tokio::test]
    async fn test_order_and_isolation() {
        let mut spiky = vec![5.0; 20];
        spiky[4] = 80.0;

        let datasets = vec![
            BatchDataset::new("a", points(&spiky), DetectionOptions::default()),
            BatchDataset::new(
                "b",
                points(&[1.0, 2.0]),
                DetectionOptions::default().with_threshold(0.0),
            ),
            BatchDataset::new("c", points(&[]), DetectionOptions::new(DetectionMethod::Iqr)),
        ];

        let results = service().batch_detect_anomalies(datasets).await;
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);

        assert_eq!(results[0].result.anomalies.len(), 1);
        assert!(!results[0].is_degraded());

        assert!(results[1].is_degraded());
        assert!(results[1].result.recommendations[0].contains("threshold"));

        assert!(!results[2].is_degraded());
        assert_eq!(results[2].result.summary.method_used, DetectionMethod::Iqr);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        assert!(service().batch_detect_anomalies(Vec::new()).await.is_empty());
    }

    #[test]
    fn test_dataset_options_default() {
        let json = r#"{"id": "x", "data": []}"#;
        let dataset: BatchDataset = serde_json::from_str(json).unwrap();
        assert_eq!(dataset.options, DetectionOptions::default());
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
    }
}
