//! Anomaly Detection Service
//!
//! 検知オプションに従って戦略を選択し、スコアを重大度・説明付きの結果に変換して
//! サマリーと推奨事項を付与する。

use super::severity;
use super::strategies::{self, ai, iqr, isolation, seasonal, zscore, PointScore};
use super::summary;
use super::types::{
    AnomalyDetectionResult, DetectedAnomaly, DetectionMethod, DetectionOptions, TimeSeriesPoint,
};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::llm::TextCompletion;
use crate::storage::{AnomalyConfigRepository, DetectionConfigRecord, NewDetectionConfig};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 異常検知サービス
///
/// 内部状態は不変で、複数タスクから同時に呼び出せる。
#[derive(Clone)]
pub struct AnomalyDetectionService {
    repository: Arc<dyn AnomalyConfigRepository>,
    completion: Option<Arc<dyn TextCompletion>>,
    config: ServiceConfig,
}

impl AnomalyDetectionService {
    /// 新しいサービスを作成
    pub fn new(repository: Arc<dyn AnomalyConfigRepository>) -> Self {
        Self {
            repository,
            completion: None,
            config: ServiceConfig::default(),
        }
    }

    /// AI検知用のテキスト生成クライアントを設定
    pub fn with_text_completion(mut self, completion: Arc<dyn TextCompletion>) -> Self {
        self.completion = Some(completion);
        self
    }

    /// サービス設定を差し替え
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// サービス設定
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// 系列全体の異常を検知
    ///
    /// 設定エラー（不正な閾値など）は計算前に返す。空の系列は異常なしの結果になる。
    pub async fn detect_anomalies(
        &self,
        series: &[TimeSeriesPoint],
        options: &DetectionOptions,
    ) -> Result<AnomalyDetectionResult> {
        options.validate()?;
        ensure_finite(series)?;

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let scores = self.score_series(&values, options).await;
        let method = options.method.as_str();

        let anomalies: Vec<DetectedAnomaly> = series
            .iter()
            .zip(scores)
            .enumerate()
            .map(|(index, (point, score))| {
                let result = severity::to_result(point.value, score.with_meta("method", method));
                (index, point, result)
            })
            .filter(|(_, _, result)| result.is_anomaly && result.score >= options.min_anomaly_score)
            .map(|(index, point, result)| DetectedAnomaly {
                index,
                timestamp: point.timestamp,
                value: point.value,
                result,
            })
            .collect();

        let summary = summary::build_summary(&anomalies, series.len(), options.method);
        let recommendations = summary::recommendations(&anomalies, &summary, Utc::now());

        debug!(
            method = %options.method,
            points = series.len(),
            anomalies = summary.total_anomalies,
            confidence = summary.confidence,
            "Anomaly detection completed"
        );

        Ok(AnomalyDetectionResult {
            anomalies,
            summary,
            recommendations,
        })
    }

    /// 手法に応じて系列を採点（季節調整が有効なら季節残差と統合）
    pub(crate) async fn score_series(
        &self,
        values: &[f64],
        options: &DetectionOptions,
    ) -> Vec<PointScore> {
        let threshold = options.adjusted_threshold();

        let scores = match options.method {
            DetectionMethod::ZScore => zscore::score(values, threshold, options.window_size),
            DetectionMethod::Iqr => iqr::score(values, threshold),
            DetectionMethod::IsolationForest => {
                isolation::score(values, options.min_anomaly_score)
            }
            DetectionMethod::Lstm => {
                warn!("LSTM detection is not implemented, using Z-score instead");
                zscore::score(values, threshold, options.window_size)
            }
            DetectionMethod::AiDetection => {
                ai::score(
                    self.completion.as_deref(),
                    &self.config.ai,
                    values,
                    options.context.as_deref(),
                )
                .await
            }
        };

        if options.seasonal_adjustment && options.method != DetectionMethod::AiDetection {
            let residuals = seasonal::score(values, threshold, self.config.seasonal.season_length);
            strategies::merge_scores(scores, residuals)
        } else {
            scores
        }
    }

    /// 名前付きの検知設定を保存
    pub async fn save_anomaly_detection_config(
        &self,
        user_id: &str,
        name: &str,
        data_source: &str,
        options: DetectionOptions,
    ) -> Result<DetectionConfigRecord> {
        let record = self
            .repository
            .create_anomaly_detection(NewDetectionConfig {
                user_id: user_id.to_string(),
                name: name.to_string(),
                data_source: data_source.to_string(),
                threshold_config: options,
            })
            .await?;

        info!(
            id = %record.id,
            user_id = %record.user_id,
            name = %record.name,
            "Anomaly detection config saved"
        );
        Ok(record)
    }
}

/// 非有限値（NaN・無限大）を含む入力を拒否
pub(crate) fn ensure_finite(series: &[TimeSeriesPoint]) -> Result<()> {
    match series.iter().position(|p| !p.value.is_finite()) {
        Some(index) => Err(Error::InvalidInput(format!(
            "non-finite value {} at index {}",
            series[index].value, index
        ))),
        None => Ok(()),
    }
}
