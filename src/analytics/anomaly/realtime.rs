//! Realtime Anomaly Detection
//!
//! 直近の履歴に新しい点を追加し、その点だけを採点する。

use super::detector::{ensure_finite, AnomalyDetectionService};
use super::severity;
use super::strategies::{iqr, zscore, PointScore, ScoreKind};
use super::types::{AnomalyResult, DetectionMethod, DetectionOptions, TimeSeriesPoint};
use crate::error::Result;
use tracing::debug;

impl AnomalyDetectionService {
    /// 新しい1点を直近の履歴と合わせて評価
    ///
    /// 履歴は末尾`window_size`点（未指定時は`realtime.window_size`）のみ使用する。
    /// zscore / iqr 以外の手法はZ-スコアで代替する。`min_anomaly_score`による除外は行わない。
    pub async fn detect_realtime_anomaly(
        &self,
        new_point: &TimeSeriesPoint,
        history: &[TimeSeriesPoint],
        options: &DetectionOptions,
    ) -> Result<AnomalyResult> {
        options.validate()?;
        ensure_finite(std::slice::from_ref(new_point))?;

        let window = options
            .window_size
            .unwrap_or(self.config().realtime.window_size);
        let start = history.len().saturating_sub(window);
        let recent = &history[start..];
        ensure_finite(recent)?;

        let values: Vec<f64> = recent
            .iter()
            .chain(std::iter::once(new_point))
            .map(|p| p.value)
            .collect();

        let threshold = options.adjusted_threshold();
        let score = match options.method {
            DetectionMethod::Iqr => iqr::score_last(&values, threshold),
            DetectionMethod::ZScore => zscore::score_last(&values, threshold, options.window_size),
            other => {
                debug!("Realtime detection does not support {}, using Z-score", other);
                zscore::score_last(&values, threshold, options.window_size)
            }
        }
        .unwrap_or_else(|| PointScore::normal(ScoreKind::GlobalZScore))
        .with_meta("method", options.method.as_str());

        let result = severity::to_result(new_point.value, score);
        if result.is_anomaly {
            debug!(
                value = new_point.value,
                score = result.score,
                severity = %result.severity,
                "Realtime anomaly detected"
            );
        }
        Ok(result)
    }
}
